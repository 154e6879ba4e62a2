use crate::config::Settings;
use crate::support::{load_store_or_exit, print_json};
use widgetry_store::{SchemaGraphCheckReport, check_schema_graph};

fn print_report(report: &SchemaGraphCheckReport) {
    println!(
        "[schema-graph] {} (schemas={}, edges={}, errors={}, warnings={})",
        if report.accepted() { "OK" } else { "FAIL" },
        report.summary.schema_count,
        report.summary.edge_count,
        report.summary.error_count,
        report.summary.warning_count
    );
    for finding in &report.errors {
        println!(
            "  - {} {} ({})",
            finding.widget_key, finding.class, finding.message
        );
    }
    for finding in &report.warnings {
        println!(
            "  - WARN {} {} ({})",
            finding.widget_key, finding.class, finding.message
        );
    }
}

pub fn run(settings: Settings, json_output: bool) {
    let store = load_store_or_exit(&settings.store_path);
    let report = check_schema_graph(&store);

    if json_output {
        print_json(&report);
    } else {
        print_report(&report);
    }

    if !report.accepted() {
        std::process::exit(1);
    }
}
