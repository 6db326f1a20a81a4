mod project_root;

pub use project_root::find_project_root;
