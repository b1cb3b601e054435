use crate::apu::{AudioSink, APU};
use crate::bus::Bus;
use crate::config::EmulatorConfig;
use crate::controller::IoPort;
use crate::cpu::{CpuError, NmiLine, CPU};
use crate::mapper::{load_mapper, Mapper, PRG_RAM_SIZE};
use crate::memory::Memory;
use crate::ppu::{OamDma, DOTS_PER_SCANLINE, OAMDMA_ADDRESS, PPU, SCANLINES};
use crate::rom::{Rom, RomError};
use crate::snapshot::Snapshot;
use log::{error, info};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

pub const WORK_RAM_SIZE: usize = 0x800;

/* video dots per processor cycle */
const DOTS_PER_CPU_CYCLE: i32 = 3;

/* where the bare-program runner starts when the dump doesn't set a reset vector */
const BARE_PROGRAM_START: u16 = 0x0600;

/**
 * One running machine: builds every device, wires the processor bus, and drives the processor,
 * video and audio in lockstep one frame at a time.
 *
 * Processor address map:
 * 0x0000-0x1fff work RAM (2KB, mirrored)
 * 0x2000-0x3fff video registers
 * 0x4000-0x4013 audio
 * 0x4014        sprite DMA
 * 0x4015        audio status
 * 0x4016-0x4017 controllers (0x4017 writes go to the audio frame counter)
 * 0x6000-0x7fff PRG RAM
 * 0x8000-0xffff PRG ROM
 */
pub struct Console {
    cpu: CPU,
    ppu: Rc<RefCell<PPU>>,
    apu: Rc<RefCell<APU>>,
    io_port: Rc<RefCell<IoPort>>,
    oam_dma: Rc<RefCell<OamDma>>,
    work_ram: Rc<RefCell<Memory>>,
    mapper: Box<dyn Mapper>,
    audio_sink: Box<dyn AudioSink>,

    /* video dots the processor may still run this scanline; goes negative when it overshoots */
    dot_budget: i32,
    /* processor cycles since the audio last caught up */
    frame_cycles: u32,
    halted: Option<CpuError>,
    frame_count: u64,
}

impl Console {
    pub fn new(rom: &Rom, config: &EmulatorConfig, audio_sink: Box<dyn AudioSink>) -> Result<Console, RomError> {
        let mapper = load_mapper(rom)?;
        let nmi = NmiLine::new();

        let ppu = Rc::new(RefCell::new(PPU::new(
            mapper.pattern_table(),
            mapper.mirroring(),
            Box::new(nmi.clone()),
        )));
        let apu = Rc::new(RefCell::new(APU::new(config.sample_rate)));
        let io_port = Rc::new(RefCell::new(IoPort::new(apu.clone())));
        let work_ram = Rc::new(RefCell::new(Memory::new(0x0000, WORK_RAM_SIZE)));

        let bus = Bus::new("cpu");
        let oam_dma = Rc::new(RefCell::new(OamDma::new(bus.downgrade(), ppu.clone())));
        bus.attach_peripheral(0x0000, 0x1fff, work_ram.clone());
        bus.attach_peripheral(0x2000, 0x3fff, ppu.clone());
        bus.attach_peripheral(0x4000, 0x4013, apu.clone());
        bus.attach_peripheral(OAMDMA_ADDRESS, OAMDMA_ADDRESS, oam_dma.clone());
        bus.attach_peripheral(0x4015, 0x4015, apu.clone());
        bus.attach_peripheral(0x4016, 0x4017, io_port.clone());
        mapper.attach(&bus);

        for (address, value) in &config.patches {
            info!("patching reads of 0x{address:04x} to 0x{value:02x}");
            bus.patch_read(*address, *value);
        }

        let mut cpu = CPU::new(bus, nmi);
        cpu.set_trace_instructions(config.trace_instructions);
        cpu.set_brk_halts(config.brk_halts);
        cpu.reset();
        info!("reset to 0x{:04x}", cpu.program_counter);

        Ok(Console {
            cpu,
            ppu,
            apu,
            io_port,
            oam_dma,
            work_ram,
            mapper,
            audio_sink,
            dot_budget: 0,
            frame_cycles: 0,
            halted: None,
            frame_count: 0,
        })
    }

    /**
     * Runs all 262 scanlines of one frame, then lets the audio catch up and hands its samples to
     * the sink. Once the processor has failed it stays stopped, the video and audio keep going,
     * and every frame reports the same error.
     */
    pub fn run_frame(&mut self) -> Result<(), CpuError> {
        for _ in 0..SCANLINES {
            self.run_scanline();
        }

        {
            let mut apu = self.apu.borrow_mut();
            apu.advance(self.frame_cycles);
            apu.drain_to(self.audio_sink.as_mut());
        }
        self.frame_cycles = 0;
        self.frame_count += 1;

        match &self.halted {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn run_scanline(&mut self) {
        self.dot_budget += DOTS_PER_SCANLINE as i32;

        while self.dot_budget > 0 {
            if self.halted.is_some() {
                /* keep time moving for the audio */
                let cycles = self.dot_budget / DOTS_PER_CPU_CYCLE;
                self.frame_cycles += cycles as u32;
                self.dot_budget -= cycles * DOTS_PER_CPU_CYCLE;
                break;
            }

            match self.cpu.step() {
                Ok(cycles) => {
                    let cycles = cycles as u32 + self.oam_dma.borrow_mut().take_stall_cycles() as u32;
                    self.dot_budget -= cycles as i32 * DOTS_PER_CPU_CYCLE;
                    self.frame_cycles += cycles;
                }
                Err(err) => {
                    error!("processor stopped: {err}");
                    self.halted = Some(err);
                }
            }
        }

        self.ppu.borrow_mut().step_scanline();
    }

    pub fn reset(&mut self) {
        self.ppu.borrow_mut().reset();
        self.apu.borrow_mut().reset();
        self.cpu.reset();
        self.dot_budget = 0;
        self.frame_cycles = 0;
        self.halted = None;
        info!("reset to 0x{:04x}", self.cpu.program_counter);
    }

    /* `port` 0 is player one */
    pub fn set_buttons(&mut self, port: usize, buttons: u8) {
        self.io_port.borrow_mut().set_buttons(port, buttons);
    }

    /* the last completed frame, 256x240 RGBA */
    pub fn frame(&self) -> Ref<'_, [u8]> {
        Ref::map(self.ppu.borrow(), |ppu| ppu.frame())
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[cfg(test)]
    pub fn halted(&self) -> Option<&CpuError> {
        self.halted.as_ref()
    }

    #[cfg(test)]
    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn ppu(&self) -> Ref<'_, PPU> {
        self.ppu.borrow()
    }

    /* battery-backed PRG RAM, if the cartridge has any */
    pub fn get_save_data(&self) -> Option<Vec<u8>> {
        self.mapper.get_save_data()
    }

    pub fn set_save_data(&mut self, data: &[u8]) {
        self.mapper.set_save_data(data);
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut work_ram = [0; WORK_RAM_SIZE];
        work_ram.copy_from_slice(self.work_ram.borrow().bytes());

        let mut prg_ram = [0; PRG_RAM_SIZE];
        if let Some(save_data) = self.mapper.get_save_data() {
            let len = save_data.len().min(PRG_RAM_SIZE);
            prg_ram[..len].copy_from_slice(&save_data[..len]);
        }

        Snapshot {
            work_ram,
            prg_ram,
            cpu: self.cpu.state(),
            ppu: self.ppu.borrow().state(),
            apu: self.apu.borrow().state(),
        }
    }

    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.work_ram.borrow_mut().load(&snapshot.work_ram);
        self.mapper.set_save_data(&snapshot.prg_ram);
        self.cpu.restore(&snapshot.cpu);
        self.ppu.borrow_mut().restore(&snapshot.ppu);
        self.apu.borrow_mut().restore(&snapshot.apu);
        self.dot_budget = 0;
        self.frame_cycles = 0;
        self.halted = None;
    }
}

/* how a bare program run ended */
pub struct BareRun {
    pub cpu: CPU,
    pub steps: u64,
    /* None when the step limit ran out first */
    pub stopped_by: Option<CpuError>,
}

/**
 * Runs a bare 6502 program from a text hex dump against 64KB of flat RAM, with no video or
 * audio attached, until the processor stops or `max_steps` instructions have run.
 */
pub fn run_bare_program(dump: &str, config: &EmulatorConfig, max_steps: u64) -> BareRun {
    let ram = Rc::new(RefCell::new(Memory::new(0x0000, 0x10000)));
    let written = ram.borrow_mut().load_hex_dump(dump);
    info!("loaded {written} bytes");

    let bus = Bus::new("bare");
    bus.attach_peripheral(0x0000, 0xffff, ram);
    for (address, value) in &config.patches {
        bus.patch_read(*address, *value);
    }

    let mut cpu = CPU::new(bus, NmiLine::new());
    cpu.set_trace_instructions(config.trace_instructions);
    cpu.set_brk_halts(config.brk_halts);
    cpu.reset();
    if cpu.program_counter == 0 {
        cpu.program_counter = BARE_PROGRAM_START;
    }

    let mut steps = 0;
    while steps < max_steps {
        if let Err(err) = cpu.step() {
            return BareRun {
                cpu,
                steps,
                stopped_by: Some(err),
            };
        }
        steps += 1;
    }
    BareRun {
        cpu,
        steps,
        stopped_by: None,
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::apu::NullSink;
    use crate::controller::{BUTTON_A, BUTTON_START};
    use crate::ppu::WRITE_BUFFER_SIZE;
    use crate::rom::tests::build_image;
    use crate::rom::HEADER_SIZE;

    /* PRG offset of a processor address in a 16KB image */
    fn prg_offset(address: u16) -> usize {
        HEADER_SIZE + (address as usize & 0x3fff)
    }

    /**
     * A console running a 16KB cartridge with `program` at 0x8000, `nmi_handler` at 0x8100 and
     * the vectors pointing at them.
     */
    pub fn console_with_program(program: &[u8], nmi_handler: &[u8], config: &EmulatorConfig) -> Console {
        let mut image = build_image(1, 1, 0, 0);
        let start = prg_offset(0x8000);
        image[start..start + program.len()].copy_from_slice(program);
        let handler = prg_offset(0x8100);
        image[handler..handler + nmi_handler.len()].copy_from_slice(nmi_handler);
        image[prg_offset(0xfffa)..prg_offset(0xfffa) + 6].copy_from_slice(&[0x00, 0x81, 0x00, 0x80, 0x00, 0x80]);

        let rom = Rom::read_rom_data(&image).unwrap();
        Console::new(&rom, config, Box::new(NullSink)).unwrap()
    }

    /* LDA #$80; STA $2000; loop: JMP loop */
    pub const ENABLE_NMI_AND_WAIT: [u8; 8] = [0xa9, 0x80, 0x8d, 0x00, 0x20, 0x4c, 0x05, 0x80];
    /* INC $10; RTI */
    pub const COUNT_FRAMES: [u8; 3] = [0xe6, 0x10, 0x40];

    #[test]
    fn test_run_frame() {
        /* LDA #$01; STA $0200; loop: JMP loop */
        let program = [0xa9, 0x01, 0x8d, 0x00, 0x02, 0x4c, 0x05, 0x80];
        let mut console = console_with_program(&program, &[], &EmulatorConfig::default());
        assert_eq!(console.cpu().program_counter, 0x8000);

        assert_eq!(console.run_frame(), Ok(()));
        assert_eq!(console.cpu().read_mem(0x0200), 0x01);
        /* RAM is mirrored up to 0x1fff */
        assert_eq!(console.cpu().read_mem(0x1a00), 0x01);
        assert_eq!(console.ppu().scanline(), 0);
        assert_eq!(console.frame_count(), 1);
        assert_eq!(console.frame().len(), WRITE_BUFFER_SIZE);
    }

    #[test]
    fn test_nmi_each_frame() {
        let mut console = console_with_program(&ENABLE_NMI_AND_WAIT, &COUNT_FRAMES, &EmulatorConfig::default());
        console.run_frame().unwrap();
        assert_eq!(console.cpu().read_mem(0x10), 1);
        console.run_frame().unwrap();
        console.run_frame().unwrap();
        assert_eq!(console.cpu().read_mem(0x10), 3);
    }

    #[test]
    fn test_halt_is_sticky() {
        let mut console = console_with_program(&[0x02], &[], &EmulatorConfig::default());
        let expected = Err(CpuError::UnhandledOpcode {
            opcode: 0x02,
            address: 0x8000,
        });

        assert_eq!(console.run_frame(), expected);
        assert_eq!(console.run_frame(), expected);
        /* video kept going */
        assert_eq!(console.frame_count(), 2);
        assert_eq!(console.ppu().scanline(), 0);
    }

    #[test]
    fn test_brk_halts_by_default() {
        let mut console = console_with_program(&[0xea, 0x00], &[], &EmulatorConfig::default());
        assert_eq!(console.run_frame(), Err(CpuError::Break { address: 0x8001 }));
        assert!(console.halted().is_some());
    }

    #[test]
    fn test_reset_clears_halt() {
        let mut console = console_with_program(&[0x00], &[], &EmulatorConfig::default());
        assert!(console.run_frame().is_err());

        console.reset();
        assert!(console.halted().is_none());
        assert_eq!(console.cpu().program_counter, 0x8000);
        assert_eq!(console.cpu().s_register, 0xff);
    }

    #[test]
    fn test_controller_read() {
        #[rustfmt::skip]
        let program = [
            0xa9, 0x01, 0x8d, 0x16, 0x40, /* LDA #1; STA $4016 */
            0xa9, 0x00, 0x8d, 0x16, 0x40, /* LDA #0; STA $4016 */
            0xad, 0x16, 0x40, 0x85, 0x00, /* LDA $4016; STA $00 */
            0xad, 0x16, 0x40, 0x85, 0x01,
            0xad, 0x16, 0x40, 0x85, 0x02,
            0xad, 0x16, 0x40, 0x85, 0x03,
            0x4c, 0x1e, 0x80,             /* loop: JMP loop */
        ];
        let mut console = console_with_program(&program, &[], &EmulatorConfig::default());
        console.set_buttons(0, BUTTON_A | BUTTON_START);
        console.run_frame().unwrap();

        let reads: Vec<u8> = (0..4).map(|address| console.cpu().read_mem(address)).collect();
        assert_eq!(reads, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_sprite_dma() {
        #[rustfmt::skip]
        let program = [
            0xa9, 0x42, 0x8d, 0x03, 0x02, /* LDA #$42; STA $0203 */
            0xa9, 0x02, 0x8d, 0x14, 0x40, /* LDA #$02; STA $4014 */
            0x4c, 0x0a, 0x80,             /* loop: JMP loop */
        ];
        let mut console = console_with_program(&program, &[], &EmulatorConfig::default());
        console.run_frame().unwrap();
        assert_eq!(console.ppu().oam()[3], 0x42);
    }

    #[test]
    fn test_read_patch() {
        /* LDA $10; STA $11; loop: JMP loop */
        let program = [0xa5, 0x10, 0x85, 0x11, 0x4c, 0x04, 0x80];
        let config = EmulatorConfig {
            patches: vec![(0x0010, 0x05)],
            ..EmulatorConfig::default()
        };
        let mut console = console_with_program(&program, &[], &config);
        console.run_frame().unwrap();
        assert_eq!(console.cpu().read_mem(0x11), 0x05);
    }

    #[test]
    fn test_nmi_enabled_in_vblank_interrupts_next_step() {
        /* LDA #$80; STA $2000; NOP */
        let program = [0xa9, 0x80, 0x8d, 0x00, 0x20, 0xea];

        /* outside vblank the write only arms the NMI, and the NOP runs */
        let mut console = console_with_program(&program, &COUNT_FRAMES, &EmulatorConfig::default());
        for _ in 0..3 {
            console.cpu.step().unwrap();
        }
        assert_eq!(console.cpu.program_counter, 0x8006);

        let mut console = console_with_program(&program, &COUNT_FRAMES, &EmulatorConfig::default());
        for _ in 0..241 {
            console.ppu.borrow_mut().step_scanline();
        }
        console.cpu.step().unwrap();
        console.cpu.step().unwrap();
        assert_eq!(console.cpu.program_counter, 0x8005);

        /* the step after the write is the interrupt, not the NOP */
        assert_eq!(console.cpu.step(), Ok(7));
        assert_eq!(console.cpu.program_counter, 0x8100);
        assert_eq!(console.cpu.s_register, 0xfc);
        assert_eq!(console.cpu.read_mem(0x01ff), 0x80);
        assert_eq!(console.cpu.read_mem(0x01fe), 0x05);

        /* the handler runs and returns to the NOP */
        console.cpu.step().unwrap();
        console.cpu.step().unwrap();
        assert_eq!(console.cpu.program_counter, 0x8005);
        assert_eq!(console.cpu.read_mem(0x10), 1);
    }

    #[test]
    fn test_unsupported_mapper() {
        let rom = Rom::read_rom_data(&build_image(1, 1, 0x10, 0)).unwrap();
        assert!(matches!(
            Console::new(&rom, &EmulatorConfig::default(), Box::new(NullSink)),
            Err(RomError::UnsupportedMapper(1))
        ));
    }

    #[test]
    fn test_audio_reaches_sink() {
        struct Counter(std::rc::Rc<std::cell::Cell<usize>>);
        impl AudioSink for Counter {
            fn queue_samples(&mut self, samples: &[i16]) {
                self.0.set(self.0.get() + samples.len());
            }
        }

        let rom = Rom::read_rom_data(&build_image(1, 1, 0, 0)).unwrap();
        let count = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut console = Console::new(&rom, &EmulatorConfig::default(), Box::new(Counter(count.clone()))).unwrap();
        /* the all-zero program is one long run of BRKs, which halts straight away */
        assert!(console.run_frame().is_err());
        /* about 1/60 of a second of samples all the same */
        assert!((725..=740).contains(&count.get()));
    }

    #[test]
    fn test_bare_program() {
        let run = run_bare_program("0600: a9 80 85 00 00", &EmulatorConfig::default(), 100);
        assert_eq!(run.steps, 2);
        assert_eq!(run.stopped_by, Some(CpuError::Break { address: 0x0604 }));
        assert_eq!(run.cpu.accumulator, 0x80);
        assert_eq!(run.cpu.read_mem(0x0000), 0x80);
    }

    #[test]
    fn test_bare_program_step_limit() {
        /* loop: JMP loop */
        let run = run_bare_program("0600: 4c 00 06", &EmulatorConfig::default(), 50);
        assert_eq!(run.steps, 50);
        assert_eq!(run.stopped_by, None);
    }
}
