use anemia_core::Stage;
use anemia_flow::{FlowRunner, Graph, GraphBuilder};
use std::sync::Arc;

use crate::tasks::StageTask;

/// Linear graph: screening → iron status → workup → therapy selection
pub fn build_anemia_workflow() -> Graph {
    let mut builder = GraphBuilder::new("renal_anemia_workflow");

    for stage in Stage::ALL {
        builder = builder.add_task(Arc::new(StageTask::new(stage)));
    }
    for stage in Stage::ALL {
        if let Some(next) = stage.next() {
            builder = builder.add_edge(stage.id(), next.id());
        }
    }

    builder.set_start_task(Stage::Screening.id()).build()
}

pub fn create_flow_runner() -> FlowRunner {
    FlowRunner::new(Arc::new(build_anemia_workflow()))
}
