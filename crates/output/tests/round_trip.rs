//! Integration tests for write/read round trips

use gray_output::{Format, Input, Output, WriteFlags};
use gray_physics::{Interaction, InteractionType};
use gray_vrmath::Vec3;
use rstest::{fixture, rstest};

fn temp_path(tag: &str) -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "gray_roundtrip_{tag}_{}_{:?}.dat",
        std::process::id(),
        std::thread::current().id()
    ));
    path
}

#[fixture]
fn records() -> Vec<Interaction> {
    vec![
        Interaction {
            type_: InteractionType::Compton,
            decay_id: 17,
            time: 1.234567890123456e-3,
            pos: Vec3::new(0.1, -2.5, 30.25),
            energy: 0.340221,
            color: 1,
            src_id: 2,
            mat_id: 5,
            det_id: 101,
            scatter_compton_phantom: 1,
            scatter_compton_detector: 2,
            scatter_rayleigh_phantom: 0,
            scatter_rayleigh_detector: 1,
            xray_flouresence: 1,
            coinc_id: 7,
            ..Default::default()
        },
        Interaction {
            type_: InteractionType::Photoelectric,
            decay_id: 18,
            time: 2.5e-3,
            pos: Vec3::new(-1.0, 0.0, 4.5),
            energy: 0.511,
            color: 0,
            src_id: 0,
            mat_id: 3,
            det_id: 44,
            coinc_id: -1,
            ..Default::default()
        },
    ]
}

fn write_and_read(
    records: &[Interaction],
    format: Format,
    flags: WriteFlags,
    tag: &str,
) -> Vec<Interaction> {
    let path = temp_path(tag);
    let mut output = Output::new(&path, format, flags).unwrap();
    for record in records {
        output.write(record).unwrap();
    }
    output.flush().unwrap();

    let mut input = Input::open(&path, format).unwrap();
    assert_eq!(input.flags(), flags);
    let read = input.read_interactions(records.len() + 5).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(read.len(), records.len());
    read
}

#[rstest]
fn binary_round_trip_is_bit_exact(records: Vec<Interaction>) {
    let read = write_and_read(
        &records,
        Format::VariableBinary,
        WriteFlags::all(),
        "bin_all",
    );
    for (written, read) in records.iter().zip(&read) {
        assert_eq!(written.time.to_bits(), read.time.to_bits());
        assert_eq!(written.energy.to_bits(), read.energy.to_bits());
        for axis in 0..3 {
            assert_eq!(written.pos[axis].to_bits(), read.pos[axis].to_bits());
        }
        assert_eq!(written.type_, read.type_);
        assert_eq!(written.decay_id, read.decay_id);
        assert_eq!(written.det_id, read.det_id);
        assert_eq!(written.src_id, read.src_id);
        assert_eq!(written.mat_id, read.mat_id);
        assert_eq!(written.coinc_id, read.coinc_id);
        assert_eq!(written.scatter_compton_phantom, read.scatter_compton_phantom);
        assert_eq!(written.xray_flouresence, read.xray_flouresence);
    }
}

#[rstest]
fn ascii_round_trip_within_tolerance(records: Vec<Interaction>) {
    let read = write_and_read(
        &records,
        Format::VariableAscii,
        WriteFlags::all(),
        "asc_all",
    );
    for (written, read) in records.iter().zip(&read) {
        assert!(((written.time - read.time) / written.time).abs() < 1e-10);
        assert!(((written.energy - read.energy) / written.energy).abs() < 1e-10);
        for axis in 0..3 {
            let delta = written.pos[axis] - read.pos[axis];
            let scale = written.pos[axis].abs().max(1.0);
            assert!((delta / scale).abs() < 1e-10);
        }
        assert_eq!(written.decay_id, read.decay_id);
        assert_eq!(written.coinc_id, read.coinc_id);
    }
}

#[rstest]
#[case::no_position(WriteFlags { pos: false, ..WriteFlags::all() }, "mask_nopos")]
#[case::no_coinc(WriteFlags { coinc_id: false, scatter_counts: false, ..WriteFlags::all() }, "mask_nocoinc")]
#[case::time_energy_only(
    WriteFlags {
        pos: false,
        log: false,
        decay_id: false,
        det_id: false,
        scatter_counts: false,
        src_id: false,
        mat_id: false,
        coinc_id: false,
        ..WriteFlags::all()
    },
    "mask_te"
)]
fn masked_binary_round_trips(
    records: Vec<Interaction>,
    #[case] flags: WriteFlags,
    #[case] tag: &str,
) {
    let read = write_and_read(&records, Format::VariableBinary, flags, tag);
    for (written, read) in records.iter().zip(&read) {
        assert_eq!(written.time.to_bits(), read.time.to_bits());
        assert_eq!(written.energy.to_bits(), read.energy.to_bits());
        if flags.pos {
            assert_eq!(written.pos, read.pos);
        } else {
            assert_eq!(read.pos, Vec3::zeros());
        }
        if flags.coinc_id {
            assert_eq!(written.coinc_id, read.coinc_id);
        }
    }
}

#[rstest]
fn legacy_binary_standard_round_trip(records: Vec<Interaction>) {
    let read = write_and_read(&records, Format::Binary, WriteFlags::all(), "legacy_bin");
    for (written, read) in records.iter().zip(&read) {
        assert_eq!(written.time.to_bits(), read.time.to_bits());
        // energy and position travel as f32 in the legacy record
        assert_eq!((written.energy as f32) as f64, read.energy);
        for axis in 0..3 {
            assert_eq!((written.pos[axis] as f32) as f64, read.pos[axis]);
        }
        assert_eq!(written.type_, read.type_);
        assert_eq!(written.decay_id, read.decay_id);
        assert_eq!(written.det_id, read.det_id);
        // ids ride in the packed log word
        assert_eq!(written.src_id, read.src_id);
        assert_eq!(written.mat_id, read.mat_id);
    }
}

#[rstest]
fn legacy_ascii_round_trip(records: Vec<Interaction>) {
    let read = write_and_read(&records, Format::Ascii, WriteFlags::all(), "legacy_asc");
    for (written, read) in records.iter().zip(&read) {
        assert_eq!(written.type_, read.type_);
        assert_eq!(written.decay_id, read.decay_id);
        assert_eq!(written.color, read.color);
        assert_eq!(written.src_id, read.src_id);
        assert_eq!(written.det_id, read.det_id);
        assert!(((written.time - read.time) / written.time).abs() < 1e-10);
        // the legacy energy column carries six significant digits
        assert!(((written.energy - read.energy) / written.energy).abs() < 1e-5);
    }
}
