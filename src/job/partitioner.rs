use crate::core::Grade;

/// One independent slice of the workload: a name and the grade whose
/// records the slice owns. Slices are disjoint because the grade filters
/// are; nothing at the storage level is relied on for isolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    pub name: String,
    pub grade: Grade,
}

/// Splits the job by membership grade.
///
/// The grid-size argument is a hint and an upper bound only: the real
/// partition count is the cardinality of the closed `Grade` enumeration,
/// so a hint of 5 over 3 grades still yields exactly 3 partitions.
pub struct GradePartitioner;

impl GradePartitioner {
    // The hint can never raise the count above the enumeration, and full
    // grade coverage wins over a hint below it: every grade must be owned
    // by exactly one partition.
    pub fn partition(_grid_size: usize) -> Vec<PartitionPlan> {
        Grade::ALL
            .iter()
            .enumerate()
            .map(|(i, grade)| PartitionPlan {
                name: format!("partition{i}"),
                grade: *grade,
            })
            .collect()
    }
}
