//! Cycle clock and timing accumulator for the 65C816 core.
//!
//! The clock tracks a single monotonic timestamp `ts`, advanced in fixed
//! sub-cycle units. Every bus access charges either `fast_step` or
//! `slow_step` depending on which clock domain the accessed bank belongs to;
//! internal (non-bus) cycles always charge `fast_step` unless the CPU has
//! been gated to the slow domain.
//!
//! # References
//! - Apple IIgs Hardware Reference, ch. 4 ("Fast and slow memory")
//! - WDC W65C816S datasheet, timing diagrams

/// Which clock domain a bus access belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    /// Fast-RAM / ROM domain, nominally 2.8 MHz on the IIgs.
    Fast,
    /// Slow-RAM / I/O domain, nominally 1 MHz on the IIgs.
    Slow,
}

/// Monotonic cycle clock with two step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    /// Current timestamp, in sub-cycle units.
    ts: u64,
    /// Timestamp increment for a fast-domain cycle.
    fast_step: u64,
    /// Timestamp increment for a slow-domain cycle.
    slow_step: u64,
    /// Count of whole cycles charged since the last reset.
    cycles_spent: u64,
    /// When set, internal (non-bus) cycles charge `slow_step` instead of
    /// `fast_step`. Mirrors the CPU being gated to the slow bus speed by a
    /// disk-motor-on condition or a shadowed register access.
    speed_gate_slow: bool,
}

impl Clock {
    /// Default IIgs-ish ratio: fast domain runs at roughly 2.8x the slow
    /// domain. Exact ratio is a host/config concern; these defaults only
    /// need to preserve `slow_step >= fast_step` and integer cycle counts.
    pub const DEFAULT_FAST_STEP: u64 = 1;
    pub const DEFAULT_SLOW_STEP: u64 = 3;

    /// Construct a new clock with the given step sizes.
    ///
    /// `slow_step` is clamped to be at least `fast_step`.
    pub fn new(fast_step: u64, slow_step: u64) -> Self {
        Self {
            ts: 0,
            fast_step,
            slow_step: slow_step.max(fast_step),
            cycles_spent: 0,
            speed_gate_slow: false,
        }
    }

    /// Current timestamp in sub-cycle units.
    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.ts
    }

    /// Total whole cycles charged since the last reset.
    #[inline]
    pub fn cycles_spent(&self) -> u64 {
        self.cycles_spent
    }

    /// Reset the clock to its power-on state, keeping the configured step
    /// sizes.
    pub fn reset(&mut self) {
        self.ts = 0;
        self.cycles_spent = 0;
        self.speed_gate_slow = false;
    }

    /// Gate internal (non-bus) cycles to the slow domain, or release the
    /// gate back to fast. Peripherals that hold the CPU at 1 MHz (disk
    /// motor, shadowed-register access) drive this.
    pub fn set_speed_gate(&mut self, slow: bool) {
        self.speed_gate_slow = slow;
    }

    /// Charge one cycle in the given domain.
    #[inline]
    pub fn charge(&mut self, speed: Speed) {
        let step = match speed {
            Speed::Fast => self.fast_step,
            Speed::Slow => self.slow_step,
        };
        self.ts += step;
        self.cycles_spent += 1;
    }

    /// Charge one internal cycle, honoring the speed gate.
    #[inline]
    pub fn charge_internal(&mut self) {
        let speed = if self.speed_gate_slow { Speed::Slow } else { Speed::Fast };
        self.charge(speed);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FAST_STEP, Self::DEFAULT_SLOW_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_and_slow_steps_advance_ts() {
        let mut clk = Clock::new(1, 3);
        clk.charge(Speed::Fast);
        assert_eq!(clk.timestamp(), 1);
        clk.charge(Speed::Slow);
        assert_eq!(clk.timestamp(), 4);
        assert_eq!(clk.cycles_spent(), 2);
    }

    #[test]
    fn slow_step_is_clamped_to_fast_step() {
        let clk = Clock::new(5, 2);
        assert_eq!(clk.slow_step, 5);
    }

    #[test]
    fn reset_clears_timestamp_but_keeps_steps() {
        let mut clk = Clock::new(1, 3);
        clk.charge(Speed::Slow);
        clk.reset();
        assert_eq!(clk.timestamp(), 0);
        assert_eq!(clk.cycles_spent(), 0);
        assert_eq!(clk.fast_step, 1);
    }

    #[test]
    fn speed_gate_routes_internal_cycles_to_slow_domain() {
        let mut clk = Clock::new(1, 3);
        clk.set_speed_gate(true);
        clk.charge_internal();
        assert_eq!(clk.timestamp(), 3);
    }
}
