use crate::config::Limits;

/// A per-station ingredient inventory slot (§3's "Ingredient (dispenser
/// slot)" row). A single concrete, bounded, operator-refillable slot — every
/// dispenser in this system behaves the same way, so there's no need for the
/// trait-based polymorphism a system with distinct container kinds would
/// require.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Dispenser {
    quantity: u32,
}

impl Dispenser {
    pub const fn full() -> Self {
        Dispenser {
            quantity: Limits::CAPACITY,
        }
    }

    pub const fn empty() -> Self {
        Dispenser { quantity: 0 }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Decrements by one if positive; returns whether a unit was consumed.
    /// Defensive per §4.5/§7: a dispenser already at 0 is a skipped step, not
    /// an error.
    pub fn try_consume_one(&mut self) -> bool {
        if self.quantity > 0 {
            self.quantity -= 1;
            true
        } else {
            false
        }
    }

    pub fn refill(&mut self) {
        self.quantity = Limits::CAPACITY;
    }

    pub fn adjust(&mut self, delta: i32) {
        self.quantity =
            (self.quantity as i64 + delta as i64).clamp(0, Limits::CAPACITY as i64) as u32;
    }

    pub fn is_exhausted(&self) -> bool {
        self.quantity == 0
    }

    pub fn is_low(&self) -> bool {
        self.quantity <= Limits::LOW_THRESHOLD
    }
}

impl Default for Dispenser {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_stops_at_zero() {
        let mut d = Dispenser { quantity: 1 };
        assert!(d.try_consume_one());
        assert!(!d.try_consume_one());
        assert_eq!(d.quantity(), 0);
    }

    #[test]
    fn adjust_clamps_to_capacity_range() {
        let mut d = Dispenser::full();
        d.adjust(1000);
        assert_eq!(d.quantity(), Limits::CAPACITY);
        d.adjust(-1000);
        assert_eq!(d.quantity(), 0);
    }

    #[test]
    fn refill_idempotent() {
        let mut d = Dispenser::empty();
        d.refill();
        d.refill();
        assert_eq!(d.quantity(), Limits::CAPACITY);
    }
}
