use console::Style;
use flicker_core::analysis::BatchSummary;
use flicker_core::pipeline::config::AnalysisConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_summary(config: &AnalysisConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Flicker Batch"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Repository"),
        s.path.apply_to(config.repository.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Sample freq"),
        s.value.apply_to(config.sample_frequency)
    );
    println!();

    println!("  {}", s.header.apply_to("Datasets"));
    match config.filter.owner {
        Some(owner) => println!(
            "    {:<12}{}",
            s.label.apply_to("Owner"),
            s.value.apply_to(owner)
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Owner"),
            s.disabled.apply_to("any")
        ),
    }
    if config.filter.exclude.is_empty() {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Exclude"),
            s.disabled.apply_to("none")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Exclude"),
            s.value.apply_to(config.filter.exclude.join(", "))
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Planes"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Channel"),
        s.value.apply_to(config.planes.channel)
    );
    match config.planes.max_frames {
        Some(max) => println!(
            "    {:<12}{}",
            s.label.apply_to("Max frames"),
            s.value.apply_to(max)
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Max frames"),
            s.disabled.apply_to("all")
        ),
    }
    println!();

    println!(
        "  {:<14}{}",
        s.header.apply_to("Reports"),
        s.value.apply_to(&config.reports)
    );
    println!();
}

pub fn print_batch_results(batch: &BatchSummary) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    println!(
        "    {:<28}{:>8}{:>8}{:>16}{:>16}",
        s.label.apply_to("Dataset"),
        s.label.apply_to("Images"),
        s.label.apply_to("Bins"),
        s.label.apply_to("Mean intensity"),
        s.label.apply_to("Fluctuation")
    );
    for (name, summary) in batch {
        println!(
            "    {:<28}{:>8}{:>8}{:>16.4}{:>16.4}",
            s.value.apply_to(name),
            summary.images.len(),
            summary.mean_amplitude_profile.len(),
            summary.mean_velocity_scalar,
            summary.mean_turbulence_scalar
        );
    }
    println!();
}
