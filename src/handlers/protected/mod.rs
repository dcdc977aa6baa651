// handlers/protected/mod.rs - Management handlers (admin JWT required)

pub mod management;
