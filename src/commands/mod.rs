pub mod checks;
pub mod help;
pub mod reaction_role;
pub mod register;
pub mod settings;
pub mod whitelist;
