use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use shanan_report::{
  FromUrl,
  detection::{DetectionFilter, ScanPolicy},
  input::ImageFileInput,
  label::{LabelCatalog, LabelError},
  model::RecordedDetectorBuilder,
  output::{Destination, OutputError, OutputMode, OutputWrapper, ReportRecord},
  task::OneShotTask,
};

struct Fixture {
  dir: TempDir,
  image: PathBuf,
  labels: PathBuf,
}

impl Fixture {
  fn new() -> anyhow::Result<Self> {
    let dir = TempDir::new()?;

    let image = dir.path().join("input.png");
    RgbImage::from_fn(200, 100, |x, y| Rgb([(x % 256) as u8, (y * 2) as u8, 64])).save(&image)?;

    let labels = dir.path().join("coco_labels.txt");
    std::fs::write(&labels, "person\nbicycle\ncar\n")?;

    Ok(Self { dir, image, labels })
  }

  fn record(&self, name: &str, body: &str) -> anyhow::Result<PathBuf> {
    let path = self.dir.path().join(name);
    std::fs::write(&path, body)?;
    Ok(path)
  }

  fn run(
    &self,
    record: &Path,
    mode: OutputMode,
    destination: Destination,
    filter: DetectionFilter,
  ) -> anyhow::Result<usize> {
    let catalog = LabelCatalog::load(&self.labels)?;
    let detector = RecordedDetectorBuilder::new(record).build()?;
    let input = ImageFileInput::open(&self.image)?;
    let output = OutputWrapper::new(mode, destination);
    let detections = OneShotTask::new(filter).run_task(input.image(), &detector, &catalog, &output)?;
    Ok(detections.len())
  }
}

const RECORD: &str = r#"{
  "detection_scores": [0.9, 0.5, 0.3],
  "detection_classes": [2, 0, 1],
  "detection_boxes": [[0.1, 0.2, 0.9, 0.8], [0.0, 0.0, 0.5, 0.5], [0.2, 0.2, 0.4, 0.4]],
  "num_detections": 3
}"#;

#[test]
fn json_report_lists_kept_detections_in_order() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record("detections.json", RECORD)?;
  let report = fixture.dir.path().join("report.json");

  let kept = fixture.run(
    &record,
    OutputMode::Json,
    Destination::File(report.clone()),
    DetectionFilter::default(),
  )?;
  assert_eq!(kept, 2);

  let records: Vec<ReportRecord> = serde_json::from_str(&std::fs::read_to_string(&report)?)?;
  assert_eq!(
    records,
    vec![
      ReportRecord {
        name: "car".to_string(),
        probability: f64::from(0.9f32),
      },
      ReportRecord {
        name: "person".to_string(),
        probability: 0.5,
      },
    ]
  );
  Ok(())
}

#[test]
fn nothing_above_threshold_gives_empty_array() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record(
    "detections.json",
    r#"{"detection_scores":[0.2],"detection_classes":[0],"detection_boxes":[[0,0,1,1]]}"#,
  )?;
  let report = fixture.dir.path().join("report.json");

  let kept = fixture.run(
    &record,
    OutputMode::Json,
    Destination::File(report.clone()),
    DetectionFilter::new(0.4),
  )?;
  assert_eq!(kept, 0);
  assert_eq!(std::fs::read_to_string(&report)?, "[]\n");
  Ok(())
}

#[test]
fn image_mode_writes_annotated_jpeg() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record("detections.json", RECORD)?;
  let output = fixture.dir.path().join("out").join("output.jpg");

  let kept = fixture.run(
    &record,
    OutputMode::Image,
    Destination::File(output.clone()),
    DetectionFilter::default(),
  )?;
  assert_eq!(kept, 2);

  let bytes = std::fs::read(&output)?;
  assert_eq!(image::guess_format(&bytes)?, image::ImageFormat::Jpeg);
  let decoded = image::load_from_memory(&bytes)?.into_rgb8();
  assert_eq!(decoded.dimensions(), (200, 100));
  Ok(())
}

#[test]
fn both_modes_consume_the_same_detections() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record("detections.json", RECORD)?;
  let filter = DetectionFilter::new(0.25);

  let json = fixture.run(
    &record,
    OutputMode::Json,
    Destination::File(fixture.dir.path().join("report.json")),
    filter,
  )?;
  let image = fixture.run(
    &record,
    OutputMode::Image,
    Destination::File(fixture.dir.path().join("output.jpg")),
    filter,
  )?;
  assert_eq!(json, 3);
  assert_eq!(json, image);
  Ok(())
}

#[test]
fn unknown_class_aborts_before_writing_output() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record(
    "detections.json",
    r#"{"detection_scores":[0.9],"detection_classes":[5],"detection_boxes":[[0,0,1,1]]}"#,
  )?;
  let output = fixture.dir.path().join("output.jpg");

  let err = fixture
    .run(
      &record,
      OutputMode::Image,
      Destination::File(output.clone()),
      DetectionFilter::default(),
    )
    .unwrap_err();
  assert!(matches!(
    err.downcast_ref::<LabelError>(),
    Some(LabelError::OutOfRange { index: 5, len: 3 })
  ));
  assert!(!output.exists());
  Ok(())
}

#[test]
fn full_scan_keeps_entries_after_a_low_score() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record(
    "detections.json",
    r#"{"detection_scores":[0.9,0.1,0.8],"detection_classes":[0,1,2],"detection_boxes":[[0,0,1,1],[0,0,1,1],[0,0,1,1]]}"#,
  )?;
  let report = Destination::File(fixture.dir.path().join("report.json"));

  let prefix = fixture.run(&record, OutputMode::Json, report.clone(), DetectionFilter::default())?;
  let full = fixture.run(
    &record,
    OutputMode::Json,
    report,
    DetectionFilter::default().with_scan(ScanPolicy::Full),
  )?;
  assert_eq!((prefix, full), (1, 2));
  Ok(())
}

#[test]
fn unwritable_destination_fails() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record("detections.json", RECORD)?;
  let blocker = fixture.dir.path().join("blocker");
  std::fs::write(&blocker, b"")?;

  let err = fixture
    .run(
      &record,
      OutputMode::Image,
      Destination::File(blocker.join("output.jpg")),
      DetectionFilter::default(),
    )
    .unwrap_err();
  assert!(err.downcast_ref::<OutputError>().is_some());
  Ok(())
}

#[test]
fn detector_url_selects_the_record() -> anyhow::Result<()> {
  let fixture = Fixture::new()?;
  let record = fixture.record("detections.json", RECORD)?;
  let url = url::Url::from_file_path(&record)
    .map_err(|_| anyhow::anyhow!("invalid path"))?
    .to_string()
    .replacen("file:", "recorded:", 1);

  let builder = RecordedDetectorBuilder::from_url(&url::Url::parse(&url)?)?;
  let detector = builder.build()?;
  let catalog = LabelCatalog::load(&fixture.labels)?;
  let input = ImageFileInput::open(&fixture.image)?;
  let report = fixture.dir.path().join("report.json");
  let output = OutputWrapper::new(OutputMode::Json, Destination::File(report.clone()));

  let detections = OneShotTask::default().run_task(input.image(), &detector, &catalog, &output)?;
  assert_eq!(detections.len(), 2);
  assert!(report.exists());
  Ok(())
}
