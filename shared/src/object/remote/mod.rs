pub mod object_shell;
pub mod proxy_list;
pub mod remote_base;
pub mod shell_list;
