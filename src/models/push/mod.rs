pub mod push_payload;
