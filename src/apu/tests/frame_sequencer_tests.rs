use crate::apu::{FrameEvent, FrameSequencer};

fn events(sequencer: &mut FrameSequencer, cycles: u32) -> Vec<(u32, FrameEvent)> {
    (1..=cycles)
        .filter_map(|cycle| match sequencer.clock() {
            FrameEvent::None => None,
            event => Some((cycle, event)),
        })
        .collect()
}

#[test]
fn test_four_step() {
    let mut sequencer = FrameSequencer::new();
    assert_eq!(
        events(&mut sequencer, 14914 * 2),
        vec![
            (3728, FrameEvent::QuarterFrame),
            (7456, FrameEvent::HalfFrame),
            (11185, FrameEvent::QuarterFrame),
            (14914, FrameEvent::HalfFrame),
            (14914 + 3728, FrameEvent::QuarterFrame),
            (14914 + 7456, FrameEvent::HalfFrame),
            (14914 + 11185, FrameEvent::QuarterFrame),
            (14914 * 2, FrameEvent::HalfFrame),
        ]
    );
}

#[test]
fn test_five_step() {
    let mut sequencer = FrameSequencer::new();
    /* switching modes clocks everything straight away */
    assert_eq!(sequencer.write(0x80), FrameEvent::HalfFrame);
    assert!(sequencer.is_five_step());

    assert_eq!(
        events(&mut sequencer, 18640),
        vec![
            (3728, FrameEvent::QuarterFrame),
            (7456, FrameEvent::HalfFrame),
            (11185, FrameEvent::QuarterFrame),
            (18640, FrameEvent::HalfFrame),
        ]
    );
}

#[test]
fn test_write_restarts() {
    let mut sequencer = FrameSequencer::new();
    for _ in 0..3000 {
        sequencer.clock();
    }
    assert_eq!(sequencer.write(0x00), FrameEvent::None);
    assert_eq!(events(&mut sequencer, 3728), vec![(3728, FrameEvent::QuarterFrame)]);
}
