use uuid::Uuid;

use super::value_objects::Slot;

/// Pure query layer over a project's member roster
///
/// Answers vacancy questions for the membership engine; derives everything
/// from the slot list and persists nothing of its own.
#[derive(Debug, Clone, Copy)]
pub struct Roster<'a> {
    slots: &'a [Slot],
}

impl<'a> Roster<'a> {
    pub fn new(slots: &'a [Slot]) -> Self {
        Self { slots }
    }

    /// Whether any slot (open or filled) carries the role
    pub fn has_role(&self, role: &str) -> bool {
        self.slots.iter().any(|s| s.role == role)
    }

    /// Whether the role has at least one open vacancy
    pub fn has_vacancy(&self, role: &str) -> bool {
        self.slots.iter().any(|s| s.vacancy && s.role == role)
    }

    /// Indices of the open slots for a role
    pub fn open_slots(&self, role: &str) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.vacancy && s.role == role)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the first open slot for a role
    pub fn first_open_slot(&self, role: &str) -> Option<usize> {
        self.slots.iter().position(|s| s.vacancy && s.role == role)
    }

    /// Whether no slot anywhere has an open vacancy
    pub fn is_fully_staffed(&self) -> bool {
        !self.slots.iter().any(|s| s.vacancy)
    }

    /// Whether the developer occupies a filled slot
    pub fn is_member(&self, developer: Uuid) -> bool {
        self.filled_slot_of(developer).is_some()
    }

    /// Index of the filled slot held by a developer
    pub fn filled_slot_of(&self, developer: Uuid) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| !s.vacancy && s.developer == Some(developer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots() -> Vec<Slot> {
        vec![
            Slot::filled(Uuid::new_v4(), "LEADER"),
            Slot::open("backend"),
            Slot::open("backend"),
            Slot::open("design"),
        ]
    }

    #[test]
    fn vacancy_queries() {
        let slots = slots();
        let roster = Roster::new(&slots);

        assert!(roster.has_vacancy("backend"));
        assert!(roster.has_role("LEADER"));
        assert!(!roster.has_vacancy("LEADER"));
        assert!(!roster.has_role("frontend"));
        assert_eq!(roster.open_slots("backend"), vec![1, 2]);
        assert_eq!(roster.first_open_slot("design"), Some(3));
        assert!(!roster.is_fully_staffed());
    }

    #[test]
    fn fully_staffed_when_no_vacancies() {
        let dev = Uuid::new_v4();
        let slots = vec![Slot::filled(dev, "LEADER"), Slot::filled(Uuid::new_v4(), "backend")];
        let roster = Roster::new(&slots);

        assert!(roster.is_fully_staffed());
        assert!(roster.is_member(dev));
        assert_eq!(roster.filled_slot_of(dev), Some(0));
        assert!(!roster.is_member(Uuid::new_v4()));
    }
}
