use console::style;
use gitlab_admin::gitlab::instance_variables::InstanceVariable;
use gitlab_admin::gitlab::sidekiq::{JobStats, ProcessMetrics, QueueMetrics};
use once_cell::sync::Lazy;
use prettytable::Row;

pub static TABLE_FORMAT: Lazy<prettytable::format::TableFormat> = Lazy::new(|| {
    use prettytable::format::{FormatBuilder, LinePosition, LineSeparator};

    FormatBuilder::new()
        .column_separator(' ')
        .separator(LinePosition::Top, LineSeparator::new('─', ' ', ' ', ' '))
        .separator(LinePosition::Title, LineSeparator::new('─', ' ', ' ', ' '))
        .separator(LinePosition::Intern, LineSeparator::new('┈', ' ', ' ', ' '))
        .separator(LinePosition::Bottom, LineSeparator::new('─', ' ', ' ', ' '))
        .padding(1, 1)
        .build()
});

fn new_table(titles: Row) -> prettytable::Table {
    let mut table = prettytable::Table::new();
    table.set_format(*TABLE_FORMAT);
    table.set_titles(titles);

    table
}

fn flag(value: bool) -> String {
    if value {
        format!("{}", style("✓").green().bold())
    } else {
        String::new()
    }
}

pub fn variables(variables: &[InstanceVariable]) -> prettytable::Table {
    let mut table = new_table(row!["key", "value", "type", "protected", "masked", "raw", "description"]);

    for variable in variables {
        let value = if variable.masked {
            format!("{}", style("[masked]").dim().italic())
        } else {
            variable.value.clone()
        };

        table.add_row(row![
            style(&variable.key).bold(),
            value,
            variable.variable_type,
            flag(variable.protected),
            flag(variable.masked),
            flag(variable.raw),
            variable.description.as_deref().unwrap_or("")
        ]);
    }

    table
}

pub fn queues(metrics: &QueueMetrics) -> prettytable::Table {
    let mut table = new_table(row!["queue", "backlog", "latency"]);

    for (name, queue) in &metrics.queues {
        table.add_row(row![name, r->queue.backlog, r->format!("{}s", queue.latency)]);
    }

    table
}

pub fn processes(metrics: &ProcessMetrics) -> prettytable::Table {
    let mut table = new_table(row!["host", "pid", "tag", "started", "busy", "queues", "labels"]);

    for process in &metrics.processes {
        table.add_row(row![
            process.hostname,
            r->process.pid,
            process.tag.as_deref().unwrap_or(""),
            process
                .started_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            r->format!("{}/{}", process.busy, process.concurrency),
            process.queues.join("\n"),
            process.labels.join(", ")
        ]);
    }

    table
}

pub fn jobs(stats: &JobStats) -> prettytable::Table {
    let mut table = new_table(row!["processed", "failed", "enqueued"]);

    table.add_row(row![
        r->stats.jobs.processed,
        r->style(stats.jobs.failed).red(),
        r->stats.jobs.enqueued
    ]);

    table
}
