//! Effective-address resolution tests: direct-page wrap, indexed page
//! crossing, indirect-long, stack-relative, and the MVN/MVP block move.

use super::{load, running};
use crate::bus::AccessFlags;
use crate::cpu::flags;

#[test]
fn direct_page_indexed_wraps_within_page_when_dl_is_zero() {
    let (mut cpu, mut bus) = running(flags::M | flags::X, false);
    cpu.d = 0x0000;
    cpu.x = 0x01;
    bus.write(0x42, 0x00, 0x0000, AccessFlags::DATA); // $00,X wraps to $00
    load(&mut bus, 0, 0x0800, &[0xB5, 0xFF]); // LDA $FF,X
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.a & 0xFF, 0x42);
}

#[test]
fn direct_page_nonzero_dl_charges_one_extra_cycle() {
    let (mut cpu, mut bus) = running(flags::M | flags::X, false);
    cpu.d = 0x0100;
    load(&mut bus, 0, 0x0800, &[0xA5, 0x10]); // LDA $10
    bus.write(0x00, 0x00, 0x0110, AccessFlags::DATA);
    let cycles = cpu.step_one_instruction(&mut bus);
    assert_eq!(cycles, 4); // fetch + offset + dp penalty + read
}

#[test]
fn absolute_indexed_x_charges_extra_cycle_on_page_cross() {
    let (mut cpu, mut bus) = running(flags::M | flags::X, false);
    cpu.dbr = 0x00;
    cpu.x = 0x01;
    load(&mut bus, 0, 0x0800, &[0xBD, 0xFF, 0x10]); // LDA $10FF,X -> $1100
    bus.write(0x00, 0x00, 0x1100, AccessFlags::DATA);
    let cycles = cpu.step_one_instruction(&mut bus);
    assert_eq!(cycles, 5); // fetch + 2 operand bytes + page-cross + read
}

#[test]
fn absolute_indexed_x_no_penalty_without_page_cross() {
    let (mut cpu, mut bus) = running(flags::M | flags::X, false);
    cpu.dbr = 0x00;
    cpu.x = 0x01;
    load(&mut bus, 0, 0x0800, &[0xBD, 0x00, 0x10]); // LDA $1000,X -> $1001
    bus.write(0x00, 0x00, 0x1001, AccessFlags::DATA);
    let cycles = cpu.step_one_instruction(&mut bus);
    assert_eq!(cycles, 4);
}

#[test]
fn direct_page_indirect_long_follows_the_three_byte_pointer() {
    let (mut cpu, mut bus) = running(0, false);
    cpu.d = 0x0000;
    // [$10] -> bank 0x02, addr 0x3000
    bus.write(0x00, 0x00, 0x0010, AccessFlags::DATA);
    bus.write(0x30, 0x00, 0x0011, AccessFlags::DATA);
    bus.write(0x02, 0x00, 0x0012, AccessFlags::DATA);
    bus.write(0xAB, 0x02, 0x3000, AccessFlags::DATA);
    bus.write(0xCD, 0x02, 0x3001, AccessFlags::DATA);
    load(&mut bus, 0, 0x0800, &[0xA7, 0x10]); // LDA [$10]
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.a, 0xCDAB);
}

#[test]
fn stack_relative_reads_relative_to_the_current_stack_pointer() {
    let (mut cpu, mut bus) = running(flags::M | flags::X, false);
    bus.write(0x99, 0x00, cpu.s.wrapping_add(3), AccessFlags::DATA);
    load(&mut bus, 0, 0x0800, &[0xA3, 0x03]); // LDA $03,S
    cpu.step_one_instruction(&mut bus);
    assert_eq!(cpu.a & 0xFF, 0x99);
}

#[test]
fn mvn_copies_forward_and_decrements_a_to_exhaustion() {
    let (mut cpu, mut bus) = running(0, false);
    cpu.a = 0x0002; // 3 bytes to move
    cpu.x = 0x2000;
    cpu.y = 0x3000;
    bus.write(0x11, 0x01, 0x2000, AccessFlags::DATA);
    bus.write(0x22, 0x01, 0x2001, AccessFlags::DATA);
    bus.write(0x33, 0x01, 0x2002, AccessFlags::DATA);
    load(&mut bus, 0, 0x0800, &[0x54, 0x02, 0x01]); // MVN dst=$02 src=$01
    cpu.step_one_instruction(&mut bus);
    assert_eq!(bus.read(0x02, 0x3000, AccessFlags::DATA), 0x11);
    assert_eq!(bus.read(0x02, 0x3001, AccessFlags::DATA), 0x22);
    assert_eq!(bus.read(0x02, 0x3002, AccessFlags::DATA), 0x33);
    assert_eq!(cpu.a, 0xFFFF);
    assert_eq!(cpu.x, 0x2003);
    assert_eq!(cpu.y, 0x3003);
    assert_eq!(cpu.dbr, 0x02);
}
