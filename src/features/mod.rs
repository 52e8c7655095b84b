// Gateway event handlers
pub mod message_log;
pub mod reaction_roles;
