use crate::config::Limits;

/// A request to assemble one recipe (§3).
///
/// Pointer-free so it can live inside the FIFO ring and inside a station's
/// assignment slot, both of which are fields of `SharedState`. `created_at`
/// is seconds since the producer's startup epoch rather than `SystemTime`,
/// which is not `repr(C)`-stable across processes.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Order {
    pub id: u64,
    pub recipe_index: u16,
    pub ingredient_indices: [i8; Limits::MAX_RECIPE_LEN],
    pub ingredient_count: u8,
    pub created_at_secs: u64,
    pub current_step: u8,
    pub completed: bool,
    pub assigned_station: i16,
    pub assignment_attempts: u8,
}

impl Order {
    pub const EMPTY: Self = Order {
        id: 0,
        recipe_index: 0,
        ingredient_indices: [-1; Limits::MAX_RECIPE_LEN],
        ingredient_count: 0,
        created_at_secs: 0,
        current_step: 0,
        completed: false,
        assigned_station: -1,
        assignment_attempts: 0,
    };

    pub fn new(
        id: u64,
        recipe_index: u16,
        ingredient_indices: &[i8],
        created_at_secs: u64,
    ) -> Self {
        assert!(ingredient_indices.len() <= Limits::MAX_RECIPE_LEN);
        let mut slots = [-1i8; Limits::MAX_RECIPE_LEN];
        slots[..ingredient_indices.len()].copy_from_slice(ingredient_indices);
        Order {
            id,
            recipe_index,
            ingredient_indices: slots,
            ingredient_count: ingredient_indices.len() as u8,
            created_at_secs,
            current_step: 0,
            completed: false,
            assigned_station: -1,
            assignment_attempts: 0,
        }
    }

    pub fn ingredient_indices(&self) -> &[i8] {
        &self.ingredient_indices[..self.ingredient_count as usize]
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_station >= 0
    }

    pub fn assign_to(&mut self, station_id: usize) {
        self.assigned_station = station_id as i16;
    }

    pub fn clear_assignment(&mut self) {
        self.assigned_station = -1;
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::EMPTY
    }
}
