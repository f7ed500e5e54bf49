//! Well-known role names and the capability hierarchy.
//!
//! Roles are issued by the external auth collaborator; the core only decides
//! what each role may do.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_CONTENT_TEAM: &str = "content_team";
pub const ROLE_PHOTOGRAPHER: &str = "photographer";
pub const ROLE_VIEWER: &str = "viewer";

/// Roles granted by holding `role` (including itself).
///
/// Unknown roles grant nothing.
pub fn granted_roles(role: &str) -> &'static [&'static str] {
    match role {
        ROLE_ADMIN => &[
            ROLE_ADMIN,
            ROLE_EDITOR,
            ROLE_CONTENT_TEAM,
            ROLE_PHOTOGRAPHER,
            ROLE_VIEWER,
        ],
        ROLE_EDITOR => &[ROLE_EDITOR, ROLE_CONTENT_TEAM, ROLE_VIEWER],
        ROLE_CONTENT_TEAM => &[ROLE_CONTENT_TEAM, ROLE_VIEWER],
        ROLE_PHOTOGRAPHER => &[ROLE_PHOTOGRAPHER, ROLE_VIEWER],
        ROLE_VIEWER => &[ROLE_VIEWER],
        _ => &[],
    }
}

/// Returns `true` if a user with `role` satisfies `required`.
pub fn has_role(role: &str, required: &str) -> bool {
    granted_roles(role).contains(&required)
}

/// Capability check for every mutating validation-queue call.
pub fn can_validate_recognition(role: &str) -> bool {
    has_role(role, ROLE_EDITOR)
}

/// Capability check for appending, reverting or resetting edit snapshots.
pub fn can_edit_images(role: &str) -> bool {
    has_role(role, ROLE_EDITOR)
}
