use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use scrub::decoder::{decode_file, decode_source};

fn pcm16_wav(samples: &[i16], sample_rate: u32, channels: u16) -> anyhow::Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    let mut w = WavWriter::new(&mut cursor, spec)?;
    for &s in samples {
        w.write_sample(s)?;
    }
    w.finalize()?;
    Ok(cursor.into_inner())
}

/// Integer PCM keeps its native rate and layout and is scaled into `[-1.0, 1.0)`.
#[test]
fn decodes_pcm16_in_native_format() -> anyhow::Result<()> {
    let bytes = pcm16_wav(&[0, 16_384, -16_384, i16::MIN], 11_025, 2)?;

    let track = decode_source(Box::new(Cursor::new(bytes)), Some("wav"))?;
    assert_eq!(track.sample_rate(), 11_025);
    assert_eq!(track.channels(), 2);
    assert_eq!(track.frames(), 2);
    assert_eq!(track.samples(), &[0.0, 0.5, -0.5, -1.0]);
    Ok(())
}

/// A file source and an in-memory source of the same bytes decode identically.
#[test]
fn file_and_memory_sources_agree() -> anyhow::Result<()> {
    let samples: Vec<i16> = (0..4_000).map(|i| ((i * 37) % 2_000 - 1_000) as i16).collect();
    let bytes = pcm16_wav(&samples, 8_000, 1)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ramp.wav");
    std::fs::write(&path, &bytes)?;

    let from_file = decode_file(&path)?;
    let from_memory = decode_source(Box::new(Cursor::new(bytes)), None)?;
    assert_eq!(from_file, from_memory);
    assert_eq!(from_file.duration(), 0.5);
    Ok(())
}

/// Garbage input fails to probe instead of producing an empty track.
#[test]
fn garbage_input_is_rejected() {
    let res = decode_source(Box::new(Cursor::new(vec![0x42u8; 4096])), None);
    assert!(res.is_err());
}
