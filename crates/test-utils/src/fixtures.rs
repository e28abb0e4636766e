#![allow(dead_code)]

//! On-disk form of the chain trace from [`crate::builders::chain_dataset`],
//! served from a `MockFileSystem`.

use std::path::PathBuf;

use traceview::fs::mock::MockFileSystem;

pub const LOG_SUBDIR: &str = "vine-logs";

const TASK_DONE_HEADER: &str = "task_id,try_id,worker_id,core_id,category,graph_id,when_ready,\
when_running,time_worker_start,time_worker_end,when_waiting_retrieval,when_retrieved,when_done,\
input_files,output_files,size_input_files(MB),size_output_files(MB),critical_input_file,\
is_recovery_task";

pub const WORKER_SUMMARY: &str = "\
worker_id,worker_hash,worker_machine_name,cores,time_connected,time_disconnected
1,abc123,node-a,2,0,100
2,def456,node-b,1.0,10,90
";

/// The second row never reached a worker and carries no slot.
pub const TASK_FAILED_ON_WORKER: &str = "\
task_id,try_id,worker_id,core_id,when_ready,when_running,when_next_ready
4,1,2,1,39,40,45
5,1,,,50,,
";

pub const FILE_INFO: &str = "\
filename,size(MB),producers,consumers,worker_holding
fileA,1.5,[1],[2],\"[[1, 7.0, 30.0, 23.0]]\"
fileB,2.0,[2],[3],\"[[2, 19.0, 40.0, 21.0], [1, 17.0, 40.0, 23.0]]\"
";

pub const GRAPH_INFO: &str = "\
graph_id,num_tasks,critical_tasks,time_critical_nodes,time_critical_edges,time_critical_path
1,3,\"[1, 2, 3]\",\"[7.0, 7.0, 7.0]\",\"[3.0, 3.0]\",27.0
";

/// Stage-in and stage-out steps of the chain's files, unsorted.
pub const WORKER_DISK_USAGE: &str = "\
worker_hash,worker_id,filename,time,size(MB),disk_usage(MB),disk_usage(%),disk_usage_accumulation(MB),disk_usage_accumulation(%)
def456,2,fileB,19.0,2.0,2.0,0.002,2.0,0.002
abc123,1,fileA,7.0,1.5,1.5,0.0015,1.5,0.0015
abc123,1,fileB,17.0,2.0,3.5,0.0035,3.5,0.0035
abc123,1.0,fileA,30.0,-1.5,2.0,0.002,3.5,0.0035
";

pub const MANAGER_INFO: &str = "\
time_start,time_end
0,100
";

/// Graphviz rendering of the chain in expanded form.
pub const CHAIN_SVG: &str = r#"<svg width="62pt" height="332pt">
<g id="graph0" class="graph" transform="scale(1 1)">
<title>G</title>
<polygon fill="white" stroke="none" points="-4,4 -4,-328 58,-328 58,4 -4,4"/>
<g id="node1" class="node">
<title>1</title>
<ellipse fill="none" stroke="black" cx="27" cy="-306" rx="27" ry="18"/>
<text text-anchor="middle" x="27" y="-302.3">1</text>
</g>
<g id="node2" class="node">
<title>fileA</title>
<polygon fill="lightgrey" stroke="black" points="54,-252 0,-252 0,-216 54,-216 54,-252"/>
<text text-anchor="middle" x="27" y="-230.3">fileA</text>
</g>
<g id="edge1" class="edge">
<title>1&#45;&gt;fileA</title>
<path fill="none" stroke="black" d="M27,-287.7C27,-279.98 27,-270.71 27,-262.11"/>
</g>
<g id="node3" class="node">
<title>2</title>
<ellipse stroke="black" cx="27" cy="-162" rx="27" ry="18"/>
<text text-anchor="middle" x="27" y="-158.3">2</text>
</g>
<g id="edge2" class="edge">
<title>fileA&#45;&gt;2</title>
<path fill="none" stroke="black" d="M27,-215.7C27,-207.98 27,-198.71 27,-190.11"/>
</g>
<g id="node4" class="node">
<title>fileB</title>
<polygon fill="none" stroke="black" points="54,-108 0,-108 0,-72 54,-72 54,-108"/>
<text text-anchor="middle" x="27" y="-86.3">fileB</text>
</g>
<g id="edge3" class="edge">
<title>2&#45;&gt;fileB</title>
<path fill="none" stroke="black" d="M27,-143.7C27,-135.98 27,-126.71 27,-118.11"/>
</g>
<g id="node5" class="node">
<title>3</title>
<ellipse fill="none" stroke="black" cx="27" cy="-18" rx="27" ry="18"/>
<text text-anchor="middle" x="27" y="-14.3">3</text>
</g>
<g id="edge4" class="edge">
<title>fileB&#45;&gt;3</title>
<path fill="none" stroke="black" d="M27,-71.7C27,-63.98 27,-54.71 27,-46.11"/>
</g>
</g>
</svg>
"#;

/// `task_done.csv` for the chain. Without `graph_ids` the column is left
/// empty, as written by traces that predate graph statistics.
pub fn task_done(graph_ids: bool) -> String {
    let g = if graph_ids { "1" } else { "" };
    format!(
        "{TASK_DONE_HEADER}
1,1,1,1,proc,{g},0,1,2,7,8,9,10,[],['fileA'],0,1.5,,False
2,1,1,2,proc,{g},10,11,12,17,18,19,20,['fileA'],['fileB'],1.5,2.0,fileA,False
3.0,1,2.0,1,proc,{g},20,21,22,27,28,29,30,\"['fileB']\",[],2.0,0,fileB,True
"
    )
}

/// `task_done.csv` from a log writer that has no `graph_id` column at all.
pub fn task_done_without_graph_column() -> String {
    task_done(false)
        .replace("category,graph_id,", "category,")
        .replace("proc,,", "proc,")
}

pub fn log_dir(root: &str, trace_id: &str) -> PathBuf {
    PathBuf::from(root).join(trace_id).join(LOG_SUBDIR)
}

/// Write every chain table under `<root>/<trace_id>/vine-logs`.
///
/// `with_graphs = false` leaves out the graph statistics table and the
/// tasks' graph ids, so the loader has to derive them.
pub fn add_chain_trace(fs: &MockFileSystem, root: &str, trace_id: &str, with_graphs: bool) {
    let dir = log_dir(root, trace_id);
    fs.add_file(dir.join("task_done.csv"), task_done(with_graphs));
    fs.add_file(dir.join("worker_summary.csv"), WORKER_SUMMARY);
    fs.add_file(dir.join("task_failed_on_worker.csv"), TASK_FAILED_ON_WORKER);
    fs.add_file(dir.join("file_info.csv"), FILE_INFO);
    fs.add_file(dir.join("general_statistics_manager.csv"), MANAGER_INFO);
    if with_graphs {
        fs.add_file(dir.join("general_statistics_dag.csv"), GRAPH_INFO);
    }
}

pub fn add_chain_svg(fs: &MockFileSystem, root: &str, trace_id: &str) {
    fs.add_file(log_dir(root, trace_id).join("subgraph_1.svg"), CHAIN_SVG);
}

pub fn add_disk_usage(fs: &MockFileSystem, root: &str, trace_id: &str) {
    fs.add_file(log_dir(root, trace_id).join("worker_disk_usage.csv"), WORKER_DISK_USAGE);
}
