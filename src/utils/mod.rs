pub mod rison;
