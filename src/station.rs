use crate::clock::now_secs;
use crate::config::Limits;
use crate::dispenser::Dispenser;
use crate::fixed_str::FixedStr;
use crate::log_ring::LogRing;
use crate::order::Order;

/// Explicit per-station state machine (§9 redesign note: replace pause-by-
/// flag-pair with a named state variable). Transitions happen only while
/// holding the station's lock (§5).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StationState {
    Idle,
    Waiting,
    Paused,
    Processing,
    Finalizing,
}

/// One parallel burger-assembly unit: its own dispensers, log, and
/// assignment slot (§3). `active`/`paused` are the inputs the operator and
/// lifecycle control write; `state` is the machine derived from them plus
/// `is_busy`, owned exclusively by the station's worker thread.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Station {
    pub id: usize,
    pub active: bool,
    pub paused: bool,
    pub state: StationState,
    pub processed_count: u32,
    pub is_busy: bool,
    pub current_order: Order,
    pub dispensers: [Dispenser; Limits::N_INGREDIENTS],
    pub dispenser_names: [FixedStr<24>; Limits::N_INGREDIENTS],
    pub dispenser_count: u8,
    pub log: LogRing<{ Limits::LOG_CAPACITY }>,
    pub status: FixedStr<64>,
    pub current_ingredient: FixedStr<24>,
    pub needs_refill: bool,
    pub last_alert_at_secs: u64,
}

impl Station {
    pub fn new(id: usize, dispenser_names: &[String]) -> Self {
        assert!(dispenser_names.len() <= Limits::N_INGREDIENTS);
        let mut names = [FixedStr::EMPTY; Limits::N_INGREDIENTS];
        for (i, name) in dispenser_names.iter().enumerate() {
            names[i] = FixedStr::new(name);
        }
        let mut station = Station {
            id,
            active: true,
            paused: false,
            state: StationState::Idle,
            processed_count: 0,
            is_busy: false,
            current_order: Order::EMPTY,
            dispensers: [Dispenser::full(); Limits::N_INGREDIENTS],
            dispenser_names: names,
            dispenser_count: dispenser_names.len() as u8,
            log: LogRing::new(),
            status: FixedStr::new("idle"),
            current_ingredient: FixedStr::EMPTY,
            needs_refill: false,
            last_alert_at_secs: 0,
        };
        station.log("BAND INITIATED", now_secs(), false);
        station
    }

    pub fn dispenser_index_of(&self, name: &str) -> Option<usize> {
        self.dispenser_names[..self.dispenser_count as usize]
            .iter()
            .position(|n| n.as_str() == name)
    }

    pub fn log(&mut self, text: &str, now_secs: u64, is_alert: bool) {
        self.log.push(text, now_secs, is_alert);
    }

    /// Eligibility check from §4.4: idle, admitted, active, not paused, and
    /// holding at least one unit of every ingredient the order requires.
    pub fn can_accept(&self, required_indices: &[i8]) -> bool {
        self.active
            && !self.paused
            && !self.is_busy
            && required_indices
                .iter()
                .all(|&idx| idx >= 0 && self.dispensers[idx as usize].quantity() > 0)
    }

    /// Recomputes `needs_refill` per §4.6's classification; does not itself
    /// decide whether to emit an alert log (the monitor owns rate-limiting).
    pub fn classify_inventory(&self) -> bool {
        let dispensers = &self.dispensers[..self.dispenser_count as usize];
        let any_exhausted = dispensers.iter().any(|d| d.is_exhausted());
        if any_exhausted {
            return true;
        }
        let low_count = dispensers.iter().filter(|d| d.is_low()).count();
        low_count >= Limits::LOW_THRESHOLD_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station_with_names(names: &[&str]) -> Station {
        Station::new(0, &names.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn full_station_is_not_flagged_needs_refill() {
        let station = station_with_names(&["bun_top", "patty", "bun_bottom"]);
        assert!(!station.classify_inventory());
    }

    #[test]
    fn exhausted_single_dispenser_flags_refill() {
        let mut station = station_with_names(&["bun_top", "patty", "bun_bottom"]);
        station.dispensers[0] = Dispenser::empty();
        assert!(station.classify_inventory());
    }

    #[test]
    fn three_low_dispensers_flag_refill_even_if_none_exhausted() {
        let mut station = station_with_names(&["bun_top", "patty", "cheese", "bun_bottom"]);
        for i in 0..3 {
            station.dispensers[i] = Dispenser::full();
            station.dispensers[i].adjust(-(Limits::CAPACITY as i32) + 1);
        }
        assert!(station.classify_inventory());
    }

    #[test]
    fn can_accept_requires_every_ingredient_present() {
        let mut station = station_with_names(&["bun_top", "patty", "bun_bottom"]);
        station.dispensers[1] = Dispenser::empty();
        assert!(!station.can_accept(&[0, 1, 2]));
        assert!(station.can_accept(&[0, 2]));
    }

    #[test]
    fn busy_or_paused_or_inactive_station_is_not_eligible() {
        let mut station = station_with_names(&["bun_top"]);
        station.is_busy = true;
        assert!(!station.can_accept(&[0]));
        station.is_busy = false;
        station.paused = true;
        assert!(!station.can_accept(&[0]));
        station.paused = false;
        station.active = false;
        assert!(!station.can_accept(&[0]));
    }
}
