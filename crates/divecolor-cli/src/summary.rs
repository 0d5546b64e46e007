use std::path::Path;

use console::Style;
use divecolor_core::config::{PerformanceConfig, PerformanceInfo};
use divecolor_core::pipeline::{AnalysisResult, ProcessOutcome};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
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
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

fn on_off(s: &Styles, enabled: bool) -> String {
    if enabled {
        s.method.apply_to("on").to_string()
    } else {
        s.disabled.apply_to("off").to_string()
    }
}

pub fn print_analysis_summary(analysis: &AnalysisResult) {
    let s = Styles::new();
    print_title(&s, "Analysis");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(analysis.input_path().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(analysis.output_path().display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(analysis.total_frames())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frame rate"),
        s.value.apply_to(format!("{:.3} fps", analysis.fps()))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Rotation"),
        s.value.apply_to(analysis.rotation())
    );
    println!();

    let samples = analysis.samples();
    println!("  {}", s.header.apply_to("Samples"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Count"),
        s.value.apply_to(samples.len())
    );
    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Frames"),
            s.value.apply_to(format!("{} .. {}", first.frame_index, last.frame_index))
        );
        let (lo, hi) = samples.iter().fold((f64::MAX, f64::MIN), |(lo, hi), e| {
            let g = e.vector.red_gain();
            (lo.min(g), hi.max(g))
        });
        println!(
            "    {:<12}{}",
            s.label.apply_to("Red gain"),
            s.value.apply_to(format!("{lo:.2} .. {hi:.2}"))
        );
    }
}

pub fn print_process_summary(outcome: &ProcessOutcome, config: &PerformanceConfig) {
    let s = Styles::new();
    print_title(&s, "Corrected Video");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(outcome.output_path.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(outcome.frames_written)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Dimensions"),
        s.value.apply_to(outcome.output_dimensions)
    );
    if outcome.output_dimensions != outcome.original_dimensions {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Rotated"),
            s.value.apply_to(format!(
                "{} from {}",
                outcome.rotation_applied, outcome.original_dimensions
            ))
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Codec"),
        s.method.apply_to(config.codec)
    );
    if config.external_reencode {
        let status = if outcome.reencoded {
            s.method.apply_to("done")
        } else {
            s.disabled.apply_to("failed, kept unoptimized output")
        };
        println!("  {:<14}{}", s.label.apply_to("Re-encode"), status);
    }
    println!();
}

pub fn print_performance_info(info: &PerformanceInfo, path: &Path) {
    let s = Styles::new();
    let c = &info.config;
    print_title(&s, "Performance");

    println!(
        "  {:<16}{}",
        s.label.apply_to("File"),
        s.path.apply_to(path.display())
    );
    println!(
        "  {:<16}{}",
        s.label.apply_to("CPU cores"),
        s.value.apply_to(info.core_count)
    );
    let gpu = if info.gpu.available {
        s.method.apply_to(info.gpu.backend.to_string())
    } else {
        s.disabled.apply_to("none".to_string())
    };
    println!("  {:<16}{}", s.label.apply_to("GPU"), gpu);
    println!();

    println!("  {}", s.header.apply_to("Settings"));
    println!(
        "    {:<16}{}",
        s.label.apply_to("batch_size"),
        s.value.apply_to(c.batch_size)
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("max_processes"),
        s.value.apply_to(c.max_processes)
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("video_quality"),
        s.value.apply_to(c.video_quality)
    );
    println!("    {:<16}{}", s.label.apply_to("use_gpu"), on_off(&s, c.use_gpu));
    println!(
        "    {:<16}{}",
        s.label.apply_to("codec"),
        s.method.apply_to(c.codec)
    );
    println!(
        "    {:<16}{}",
        s.label.apply_to("external_reencode"),
        on_off(&s, c.external_reencode)
    );
}
