pub mod token_purge;
