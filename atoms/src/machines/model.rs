use serde::Serialize;

/// Cost-allocation label for one machine, used by the cost rollup.
#[derive(Debug, Serialize, Clone)]
pub struct MachineCostcenter {
    pub machine_id: String,
    pub costcenter: String,
}
