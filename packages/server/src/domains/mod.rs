// Domain modules

pub mod submissions;
