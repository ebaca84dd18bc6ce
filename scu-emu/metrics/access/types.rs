use crate::metric_enum;

metric_enum! {
    /// Guest-visible access outcomes, one counter each
    pub enum AccessEvent {
        Read => "reads_total",
        Write => "writes_total",
        OutOfBounds => "out_of_bounds_total",
        ReadOnlyWrite => "read_only_writes_total",
        LockViolation => "lock_violations_total",
        WriteOnlyRead => "write_only_reads_total",
        ProtectedStrapWrite => "protected_strap_writes_total",
        RandomRead => "random_reads_total",
    }
}
