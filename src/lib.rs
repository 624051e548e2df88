pub mod eval_commands {
    pub mod eval_command_evaluate;
}
pub mod eval_framework {
    pub mod evaluation_config;
    pub mod evaluation_error;
    pub mod file_pairs;
    pub mod report;
}
pub mod eval_objects {
    pub mod event;
    pub mod stat_vector;
    pub mod trace_record;
}
pub mod techniques {
    pub mod aggregator;
    pub mod stream_synchronizer;
    pub mod trace_comparator;
}
pub mod line_reader;
