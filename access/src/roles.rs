//! The dashboard role set
//!
//! Role ids come from the backend and the set has grown over time.
//! Permission membership, landing routes and menus are all keyed on this
//! one enum, so adding a role means touching those three tables and
//! nothing else; the crate tests assert the three stay in sync.

/// Known dashboard roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Teacher,
    Accountant,
    /// The self-service role; its users carry a `student_id`
    Student,
    Librarian,
}

/// Every known role, in backend id order
pub const ROLES: [Role; 5] = [
    Role::Admin,
    Role::Teacher,
    Role::Accountant,
    Role::Student,
    Role::Librarian,
];

impl Role {
    /// Maps a backend role id to a known role
    pub fn from_id(id: i32) -> Option<Role> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Teacher),
            3 => Some(Role::Accountant),
            4 => Some(Role::Student),
            5 => Some(Role::Librarian),
            _ => None,
        }
    }

    /// Backend id of this role
    pub fn id(self) -> i32 {
        match self {
            Role::Admin => 1,
            Role::Teacher => 2,
            Role::Accountant => 3,
            Role::Student => 4,
            Role::Librarian => 5,
        }
    }
}
