// handlers/protected/folders - folders, the plans inside them, and plan projects
pub mod folder;
pub mod plan;
pub mod project;
