use std::cell::Cell;
use std::rc::Rc;

/* what a co-processor is given instead of the processor itself */
pub trait InterruptSink {
    fn request_nmi(&self);
}

/**
 * The processor's NMI input. Clones share the same line: the processor keeps one and hands
 * others out as interrupt sinks, then services the pending flag at the top of its next step.
 */
#[derive(Clone, Default)]
pub struct NmiLine {
    pending: Rc<Cell<bool>>,
}

impl NmiLine {
    pub fn new() -> NmiLine {
        NmiLine::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub fn set_pending(&self, pending: bool) {
        self.pending.set(pending);
    }

    /* reads and clears */
    pub fn take(&self) -> bool {
        self.pending.replace(false)
    }
}

impl InterruptSink for NmiLine {
    fn request_nmi(&self) {
        self.pending.set(true);
    }
}
