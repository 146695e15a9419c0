//! Interrupt and reset microcode tests: vector dispatch, push-frame shape,
//! RTI round-tripping, and the WAI/STP halt states.

use super::{harness_with_vectors, load, running};
use crate::bus::AccessFlags;
use crate::cpu::{flags, LastAction};

#[test]
fn irq_is_masked_by_the_i_flag() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0800, 0x0000, 0x2000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = flags::I;
    cpu.pc = 0x0800;
    load(&mut bus, 0, 0x0800, &[0xEA]); // NOP
    cpu.set_irq(true);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.pc, 0x0801); // ran the NOP, did not vector
    assert_eq!(cpu.last_action(), LastAction::FetchedOpcode);
}

#[test]
fn irq_unmasked_pushes_pc_and_status_then_vectors() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0800, 0x0000, 0x2000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = 0;
    cpu.pc = 0x1234;
    let sp_before = cpu.s;
    cpu.set_irq(true);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.pc, 0x2000);
    assert_eq!(cpu.last_action(), LastAction::Irq);
    assert!(cpu.flag(flags::I));
    assert_eq!(cpu.s, sp_before.wrapping_sub(3));
    let status = bus.read(0, cpu.s.wrapping_add(1), AccessFlags::STACK);
    assert_eq!(status & flags::B, 0); // hardware IRQ, not BRK: B clear
}

#[test]
fn nmi_is_edge_triggered_and_consumed_once() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0800, 0x3000, 0x2000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = 0;
    cpu.pc = 0x1234;
    load(&mut bus, 0, 0x1234, &[0xEA]); // NOP for the next natural step
    cpu.set_nmi(true);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.pc, 0x3000);
    assert_eq!(cpu.last_action(), LastAction::Nmi);
    // A second step with no fresh pulse must not re-enter NMI.
    load(&mut bus, 0, 0x3000, &[0xEA]);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::FetchedOpcode);
}

#[test]
fn brk_sets_the_break_flag_in_the_pushed_status() {
    let (mut cpu, mut bus) = running(0, true);
    load(&mut bus, 0, 0x0800, &[0x00, 0xEA]); // BRK <signature>
    cpu.step_one_instruction(&mut bus);
    let status = bus.read(0, cpu.s.wrapping_add(1), AccessFlags::STACK);
    assert_eq!(status & flags::B, flags::B);
    assert!(cpu.flag(flags::I));
}

#[test]
fn rti_restores_status_and_pc_pushed_by_irq() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0800, 0x0000, 0x2000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = 0;
    cpu.pc = 0x1234;
    cpu.set_irq(true);
    cpu.step_one_instruction(&mut bus); // vectors to $2000, pushes 0x1234/status
    load(&mut bus, 0, 0x2000, &[0x40]); // RTI
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.pc, 0x1234);
    assert!(!cpu.flag(flags::I));
}

#[test]
fn wai_halts_dispatch_until_an_interrupt_is_pending() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0800, 0x0000, 0x2000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = 0;
    cpu.pc = 0x0800;
    load(&mut bus, 0, 0x0800, &[0xCB]); // WAI
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::FetchedOpcode);
    assert!(!cpu.ready_out);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::Waiting);
    cpu.set_irq(true);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::Irq);
    assert!(cpu.ready_out);
}

#[test]
fn stp_ignores_pending_nmi_and_irq() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0900, 0x3000, 0x2000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = 0;
    cpu.pc = 0x0800;
    load(&mut bus, 0, 0x0800, &[0xDB]); // STP
    cpu.step_one_instruction(&mut bus);
    assert!(!cpu.enabled);
    cpu.set_nmi(true);
    cpu.set_irq(true);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::Stopped);
    assert_eq!(cpu.pc, 0x0800); // neither pin moved PC off the STP site
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::Stopped);
}

#[test]
fn stp_halts_until_reset() {
    let (mut cpu, mut bus) = harness_with_vectors(0x0900, 0x0000, 0x0000);
    cpu.resb_in = false;
    cpu.state = crate::cpu::CpuState::Execute;
    cpu.emulation = true;
    cpu.p = 0;
    cpu.pc = 0x0800;
    load(&mut bus, 0, 0x0800, &[0xDB]); // STP
    cpu.step_one_instruction(&mut bus);
    assert!(!cpu.enabled);
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.last_action(), LastAction::Stopped);
    cpu.assert_reset(0);
    cpu.step_one_instruction(&mut bus);
    assert!(cpu.enabled);
    assert_eq!(cpu.pc, 0x0900);
}
