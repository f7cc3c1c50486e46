use super::RunReport;
use crate::cli::Output;

/// Human-readable end-of-run summary
pub fn print_summary(output: &Output, report: &RunReport) {
    output.separator();
    output.section_header("PROCESSING SUMMARY");
    output.key_value("Total folders:", &report.total_folders.to_string(), false);
    output.key_value("Successful:", &report.successful.to_string(), report.failed == 0);
    output.key_value("Failed:", &report.failed.to_string(), false);
    output.key_value(
        "Total processing time:",
        &format!("{:.1}s", report.total_duration),
        false,
    );

    if report.failed > 0 {
        output.warning("Failed folders:");
        for name in report.failed_units() {
            output.list_item(name);
        }
    }
    output.separator();

    if report.failed > 0 {
        output.warning("Some folders failed to process. Check the results file for details.");
    } else {
        output.success("All folders processed successfully!");
    }
}
