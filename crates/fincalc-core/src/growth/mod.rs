pub mod compound;
pub mod sip;
