use console::Style;
use luckystack_core::filters::gaussian_blur::normalize_kernel_size;
use luckystack_core::pipeline::config::PipelineConfig;
use luckystack_core::pipeline::{PipelineOutput, VideoReport};

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

/// Severity of a one-line status message.
#[derive(Clone, Copy, Debug)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn style(self) -> Style {
        match self {
            Self::Info => Style::new().cyan(),
            Self::Success => Style::new().green().bold(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red().bold(),
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "done",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

pub fn print_status(level: Level, message: &str) {
    let tag = level.style().apply_to(level.tag());
    match level {
        Level::Warning | Level::Error => eprintln!("  {tag}: {message}"),
        Level::Info | Level::Success => println!("  {tag}: {message}"),
    }
}

pub fn print_run_summary(config: &PipelineConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Lucky Imaging"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    println!("  {}", s.header.apply_to("Inputs"));
    for video in &config.videos {
        println!("    {}", s.path.apply_to(video.display()));
    }
    println!();

    println!("  {}", s.header.apply_to("Extraction"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Superres"),
        s.value.apply_to(format!("{}x", config.superres))
    );
    match config.nframes {
        Some(n) => println!(
            "    {:<12}{} {}",
            s.label.apply_to("Frames"),
            s.value.apply_to(n),
            s.disabled.apply_to("(not applied)")
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Frames"),
            s.value.apply_to("all")
        ),
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Coadd"),
        s.value.apply_to(config.coadd.mode)
    );
    println!();

    println!("  {}", s.header.apply_to("Unsharp Mask"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Kernel"),
        s.value.apply_to(normalize_kernel_size(config.sharpen.kernel_size))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sigma"),
        s.value.apply_to(config.sharpen.sigma)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Strength"),
        s.value.apply_to(format!("{:.3}", config.sharpen.strength()))
    );
    println!();

    match config.output.dir {
        Some(ref dir) => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.path.apply_to(dir.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Output"),
            s.disabled.apply_to("none")
        ),
    }
    println!();
}

pub fn print_video_report(report: &VideoReport) {
    let name = report.video.display();
    match &report.outcome {
        Ok(PipelineOutput::Image(result)) => {
            print_status(
                Level::Success,
                &format!(
                    "{name}: coadded {} frame(s) into {}x{}",
                    result.coadded.frame_count,
                    result.sharpened.width(),
                    result.sharpened.height()
                ),
            );
            for path in &report.written {
                print_status(Level::Info, &format!("saved {}", path.display()));
            }
        }
        Ok(PipelineOutput::NoImage) => {
            print_status(Level::Warning, &format!("{name}: no valid frames, nothing produced"));
        }
        Err(e) => print_status(Level::Error, &format!("{name}: {e}")),
    }
}
