use std::sync::mpsc::Sender;

pub mod program_state;

mod render_requester;
mod scheduler;

pub use render_requester::RenderRequester;

pub enum SimulatorSignal {
    HandleSave(Sender<Option<Vec<u8>>>),
    SaveSnapshot,
    LoadSnapshot,
    Reset,
    DumpViews,
    EndSimulation,
}
