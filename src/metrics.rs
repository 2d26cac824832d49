use serde::Serialize;

/// One timed step of the benchmarked program's startup
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    InitSwapchain,
    InitCommands,
    InitSynchStructures,
    InitDescriptors,
    InitPipelines,
    TotalTime,
}

impl Phase {
    /// Every phase in canonical order, `TotalTime` last
    pub const ALL: [Phase; 6] = [
        Phase::InitSwapchain,
        Phase::InitCommands,
        Phase::InitSynchStructures,
        Phase::InitDescriptors,
        Phase::InitPipelines,
        Phase::TotalTime,
    ];

    /// The key used for this phase in baseline files
    pub fn key(self) -> &'static str {
        match self {
            Phase::InitSwapchain => "init_swapchain",
            Phase::InitCommands => "init_commands",
            Phase::InitSynchStructures => "init_synch_structures",
            Phase::InitDescriptors => "init_descriptors",
            Phase::InitPipelines => "init_pipelines",
            Phase::TotalTime => "total_time",
        }
    }

    /// The label used for this phase in comparison reports
    pub fn label(self) -> &'static str {
        match self {
            Phase::TotalTime => "Total time",
            other => other.key(),
        }
    }

    pub fn from_key(key: &str) -> Option<Phase> {
        Phase::ALL.iter().copied().find(|p| p.key() == key)
    }
}

/// Durations captured from one run, all in microseconds
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub init_swapchain: u64,
    pub init_commands: u64,
    pub init_synch_structures: u64,
    pub init_descriptors: u64,
    pub init_pipelines: u64,
    pub total_time: u64,
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::InitSwapchain => self.init_swapchain,
            Phase::InitCommands => self.init_commands,
            Phase::InitSynchStructures => self.init_synch_structures,
            Phase::InitDescriptors => self.init_descriptors,
            Phase::InitPipelines => self.init_pipelines,
            Phase::TotalTime => self.total_time,
        }
    }

    /// Overwrite a phase's duration; repeated sets keep the last value
    pub fn set(&mut self, phase: Phase, micros: u64) {
        let field = match phase {
            Phase::InitSwapchain => &mut self.init_swapchain,
            Phase::InitCommands => &mut self.init_commands,
            Phase::InitSynchStructures => &mut self.init_synch_structures,
            Phase::InitDescriptors => &mut self.init_descriptors,
            Phase::InitPipelines => &mut self.init_pipelines,
            Phase::TotalTime => &mut self.total_time,
        };
        *field = micros;
    }

    /// Iterate over `(phase, micros)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Phase, u64)> + '_ {
        Phase::ALL.iter().map(move |&p| (p, self.get(p)))
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
