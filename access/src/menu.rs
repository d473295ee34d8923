//! Role → navigation menu
//!
//! Pure configuration data: ordered sections of entries per role. Collapse
//! state and rendering belong to the layout shell. The one hard contract
//! is that every emitted path is granted by the permission table for the
//! same role; neither component enforces that alone, so the crate tests
//! check it across the board.

use crate::landing::DEFAULT_LANDING;
use crate::roles::Role;

/// Single navigation entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    /// Route the entry navigates to
    pub path: &'static str,
    /// Display label
    pub label: &'static str,
    /// Icon name, resolved by the shell's icon set
    pub icon: &'static str,
}

/// Titled group of entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSection {
    /// Section title
    pub title: &'static str,
    /// Entries in display order
    pub entries: Vec<MenuEntry>,
}

const fn entry(path: &'static str, label: &'static str, icon: &'static str) -> MenuEntry {
    MenuEntry { path, label, icon }
}

fn section(title: &'static str, entries: &[MenuEntry]) -> MenuSection {
    MenuSection {
        title,
        entries: entries.to_vec(),
    }
}

/// Ordered menu for a role
///
/// Total over role ids; unknown roles get a generic fallback list.
pub fn build_menu(role_id: i32) -> Vec<MenuSection> {
    match Role::from_id(role_id) {
        Some(Role::Admin) => vec![
            section(
                "General",
                &[
                    entry("/dashboard/admin", "Dashboard", "home"),
                    entry("/students", "Students", "users"),
                    entry("/staff", "Staff", "briefcase"),
                    entry("/classes", "Classes", "layers"),
                ],
            ),
            section(
                "Academics",
                &[
                    entry("/grades", "Grades", "award"),
                    entry("/library", "Library", "book"),
                ],
            ),
            section("Finance", &[entry("/fees", "Fees", "credit-card")]),
            section("System", &[entry("/settings", "Settings", "settings")]),
        ],
        Some(Role::Teacher) => vec![
            section(
                "General",
                &[
                    entry("/dashboard/teacher", "Dashboard", "home"),
                    entry("/students", "Students", "users"),
                    entry("/classes", "Classes", "layers"),
                ],
            ),
            section(
                "Academics",
                &[
                    entry("/grades", "Grades", "award"),
                    entry("/library", "Library", "book"),
                ],
            ),
        ],
        Some(Role::Accountant) => vec![
            section(
                "General",
                &[entry("/dashboard/accountant", "Dashboard", "home")],
            ),
            section("Finance", &[entry("/fees", "Fees", "credit-card")]),
        ],
        Some(Role::Student) => vec![
            section(
                "General",
                &[entry("/dashboard/student", "Dashboard", "home")],
            ),
            section(
                "Academics",
                &[
                    entry("/grades", "Grades", "award"),
                    entry("/library", "Library", "book"),
                ],
            ),
        ],
        Some(Role::Librarian) => vec![section(
            "General",
            &[entry("/library", "Library", "book")],
        )],
        None => vec![section("General", &[entry(DEFAULT_LANDING, "Home", "home")])],
    }
}
