pub mod delivery;
pub mod diagnostic; // Pipeline diagnostic dump (LABBOT_DUMP_DIR)
pub mod extraction;
pub mod processor; // Report processing orchestrator
pub mod speech;
pub mod translation;
