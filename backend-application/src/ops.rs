pub mod bonus_index_reconciler;

pub use bonus_index_reconciler::BonusIndexReconciler;
