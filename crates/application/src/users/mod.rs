pub mod last_seen;
