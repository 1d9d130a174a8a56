//! Take loading using Symphonia
//!
//! Any container/codec Symphonia probes successfully is accepted. Multi-channel
//! audio is averaged to mono and integer formats are scaled to [-1.0, 1.0].

use std::fs::File;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::waveform::Waveform;
use crate::error::CompositeError;
use crate::preprocessing::channel_mixer::interleaved_to_mono;

/// One successfully decoded take
#[derive(Debug, Clone)]
pub struct LoadedTake {
    /// Position of the file in the caller's input list
    pub input: usize,
    /// Source path
    pub path: PathBuf,
    /// Decoded mono audio
    pub waveform: Waveform,
}

/// Takes that loaded, plus the ones that did not
#[derive(Debug, Default)]
pub struct LoadedTakes {
    /// Successfully decoded takes, in input order
    pub takes: Vec<LoadedTake>,
    /// Paths that failed to load and why
    pub failures: Vec<(PathBuf, CompositeError)>,
}

impl LoadedTakes {
    /// Waveforms only, in input order
    pub fn waveforms(&self) -> Vec<Waveform> {
        self.takes.iter().map(|t| t.waveform.clone()).collect()
    }

    /// Input-list index of the `take`-th loaded take
    ///
    /// Loaded takes are numbered without the failures, so this differs from
    /// `take` once any earlier input failed to load.
    pub fn input_index(&self, take: usize) -> Option<usize> {
        self.takes.get(take).map(|t| t.input)
    }
}

/// Decode one take file to a mono waveform
///
/// # Errors
///
/// Returns `CompositeError::DecodingError` if the file cannot be opened, probed,
/// or has no decodable audio track.
pub fn load_take(path: &Path) -> Result<Waveform, CompositeError> {
    log::debug!("Decoding take: {}", path.display());

    let src = File::open(path)
        .map_err(|e| CompositeError::DecodingError(format!("{}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| {
            CompositeError::DecodingError(format!(
                "{}: no supported audio tracks found",
                path.display()
            ))
        })?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.ok_or_else(|| {
        CompositeError::DecodingError(format!("{}: unknown sample rate", path.display()))
    })?;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let channels = spec.channels.count();
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend(interleaved_to_mono(buf.samples(), channels));
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("{}: skipping corrupt packet ({})", path.display(), msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }

    log::debug!(
        "Decoded {}: {} samples at {} Hz",
        path.display(),
        samples.len(),
        sample_rate
    );

    Waveform::new(samples, sample_rate)
}

/// Load every take, skipping (and logging) the ones that fail
///
/// Loading is independent per take; with `parallel` set the files are decoded
/// on the rayon pool. Input order is preserved in both result lists.
pub fn load_takes<P: AsRef<Path> + Sync>(paths: &[P], parallel: bool) -> LoadedTakes {
    let load = |p: &P| {
        let path = p.as_ref().to_path_buf();
        let result = load_take(&path);
        (path, result)
    };

    let results: Vec<(PathBuf, Result<Waveform, CompositeError>)> = if parallel {
        paths.par_iter().map(load).collect()
    } else {
        paths.iter().map(load).collect()
    };

    let mut loaded = LoadedTakes::default();
    for (input, (path, result)) in results.into_iter().enumerate() {
        match result {
            Ok(waveform) => loaded.takes.push(LoadedTake {
                input,
                path,
                waveform,
            }),
            Err(e) => {
                log::warn!("Error loading {}: {}", path.display(), e);
                loaded.failures.push((path, e));
            }
        }
    }

    log::debug!(
        "Loaded {}/{} takes",
        loaded.takes.len(),
        loaded.takes.len() + loaded.failures.len()
    );

    loaded
}
