use std::io::{Cursor, Seek, Write};
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::track::Track;

/// WAV layout used for every file we write: 32-bit float at the track's own rate and channels.
///
/// Float keeps decoded samples bit-exact, so pass-through audio is not requantized before
/// ffmpeg (or the caller) sees it.
pub fn wav_spec_for(track: &Track) -> Result<WavSpec> {
    let channels = u16::try_from(track.channels()).context("too many channels for WAV")?;
    Ok(WavSpec {
        channels,
        sample_rate: track.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    })
}

/// Write `track` as WAV into any seekable writer.
pub fn write_wav_to<W>(track: &Track, w: W) -> Result<()>
where
    W: Write + Seek,
{
    let mut writer =
        WavWriter::new(w, wav_spec_for(track)?).context("failed to start WAV stream")?;

    for &s in track.samples() {
        writer.write_sample(s)?;
    }

    writer.finalize().context("failed to finalize WAV stream")?;
    Ok(())
}

/// Write `track` as a WAV file at `path`, replacing anything already there.
pub fn write_wav(track: &Track, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = std::io::BufWriter::new(
        std::fs::File::create(path)
            .with_context(|| format!("failed to create '{}'", path.display()))?,
    );
    write_wav_to(track, file).with_context(|| format!("failed to write '{}'", path.display()))
}

/// Encode `track` as WAV bytes in memory.
pub fn encode_wav(track: &Track) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav_to(track, &mut cursor)?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    #[test]
    fn encoded_wav_reads_back_exactly() -> anyhow::Result<()> {
        let track = Track::new(vec![0.1, -0.2, 0.3, -0.4], 44_100, 2)?;
        let bytes = encode_wav(&track)?;

        let mut reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.sample_format, SampleFormat::Float);

        let samples: Vec<f32> = reader.samples::<f32>().collect::<Result<_, _>>()?;
        assert_eq!(samples, track.samples());
        Ok(())
    }

    #[test]
    fn write_wav_creates_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.wav");
        write_wav(&Track::new(vec![0.0; 10], 8_000, 1)?, &path)?;

        let reader = WavReader::open(&path)?;
        assert_eq!(reader.duration(), 10);
        Ok(())
    }
}
