pub mod constants;
pub mod crossing;
pub mod diagnostics;
pub mod intervals;
pub mod satvis_errors;
pub mod schedule_tree;
pub mod vis_history;
pub mod vis_params;
pub mod visibility_func;
pub mod zero_crossing_fit;
