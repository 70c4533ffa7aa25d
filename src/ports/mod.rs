pub mod checkpoint_port;
pub mod report_port;
pub mod sim_port;
