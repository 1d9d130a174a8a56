//! Integration tests for the composite pipeline

use std::fs;
use std::path::{Path, PathBuf};

use take_composite::analysis::alignment::align_takes;
use take_composite::analysis::synthesis::{composite_len, find_closest_hit};
use take_composite::features::segment::{extract_hit, segment_len};
use take_composite::io::decoder::{load_take, load_takes};
use take_composite::{
    build_composite, build_composite_loaded, composite_files, CompositeConfig, CompositeError,
    CompositeFlag, OnsetEvent, OutputFormat, TakeProfile, VolumeAveraging, Waveform,
};

const SAMPLE_RATE: u32 = 44100;

/// Decaying tonal bursts ("hits") at the given times and amplitudes
fn synth_take(hit_times: &[f64], amplitudes: &[f32], duration: f64) -> Vec<f32> {
    let mut samples = vec![0.0f32; (duration * SAMPLE_RATE as f64) as usize];
    let burst = (0.12 * SAMPLE_RATE as f64) as usize;
    for (&t, &amp) in hit_times.iter().zip(amplitudes) {
        let start = (t * SAMPLE_RATE as f64) as usize;
        for i in 0..burst.min(samples.len().saturating_sub(start)) {
            let decay = (-(i as f32) / burst as f32 * 10.0).exp();
            let tone = ((i as f32) * 0.61).sin() + 0.5 * ((i as f32) * 1.73).sin();
            samples[start + i] = amp * decay * tone / 1.5;
        }
    }
    samples
}

fn take(hit_times: &[f64], amplitudes: &[f32], duration: f64) -> Waveform {
    Waveform::new(synth_take(hit_times, amplitudes, duration), SAMPLE_RATE).unwrap()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "take-composite-{}-{}",
        name,
        std::process::id()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn write_stereo_pcm16(path: &Path, frames: &[(i16, i16)]) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &(left, right) in frames {
        writer.write_sample(left).unwrap();
        writer.write_sample(right).unwrap();
    }
    writer.finalize().unwrap();
}

fn profile(take: usize, hits: &[(f64, f64)]) -> TakeProfile {
    TakeProfile {
        take,
        events: hits
            .iter()
            .map(|&(time, volume)| OnsetEvent {
                time,
                volume: Some(volume),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_takes_reproduce_source_segments() {
        let times = [0.5, 1.0, 1.5, 2.0];
        let source = take(&times, &[0.9, 0.5, 0.7, 0.3], 2.6);
        let takes = vec![source.clone(), source.clone(), source.clone()];

        let config = CompositeConfig::default();
        let result = build_composite(&takes, &config).expect("composite should succeed");

        assert_eq!(result.hits.len(), times.len());
        assert_eq!(result.hits[0].time, 0.0);
        assert_eq!(result.selections.len(), times.len());

        for selection in &result.selections {
            assert_eq!(selection.take, 0, "ties must go to the first take");
            assert_eq!(selection.onset, selection.position);

            let expected = extract_hit(
                &source,
                selection.source_time,
                config.segment_duration,
                config.segment_offset,
            );
            let dest = selection.dest_sample;
            let written = &result.waveform.samples()[dest..dest + selection.written];
            assert_eq!(written, &expected[..selection.written]);
        }
    }

    #[test]
    fn test_two_take_scenario() {
        let a = profile(0, &[(1.0, -10.0), (2.0, -5.0)]);
        let b = profile(1, &[(1.2, -8.0), (2.1, -6.0)]);
        let profiles = [a, b];

        let hits = align_takes(&profiles, VolumeAveraging::Decibel);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].time, 0.0);
        assert!((hits[1].time - 0.95).abs() < 1e-9);
        assert!((hits[0].volume.unwrap() + 9.0).abs() < 1e-9);
        assert!((hits[1].volume.unwrap() + 5.5).abs() < 1e-9);

        // A and B are both 1.0 dB from -9.0; take order wins
        let first = find_closest_hit(&profiles, hits[0].volume.unwrap()).unwrap();
        assert_eq!((first.take, first.onset, first.time), (0, 0, 1.0));

        // -5.5 is 0.5 dB from both A's -5.0 and B's -6.0; take order wins again
        let second = find_closest_hit(&profiles, hits[1].volume.unwrap()).unwrap();
        assert_eq!((second.take, second.onset), (0, 1));
    }

    #[test]
    fn test_shared_hits_is_shortest_take() {
        let takes = vec![
            take(&[0.4, 0.9, 1.4], &[0.8, 0.6, 0.7], 2.0),
            take(&[0.45, 0.95], &[0.7, 0.7], 2.0),
            take(&[0.42, 0.92, 1.42, 1.8], &[0.6, 0.8, 0.5, 0.9], 2.0),
        ];

        let result = build_composite(&takes, &CompositeConfig::default()).unwrap();

        let min_hits = *result.metadata.hits_per_take.iter().min().unwrap();
        assert_eq!(result.metadata.shared_hits, min_hits);
        assert_eq!(result.hits.len(), min_hits);
        assert_eq!(result.metadata.hits_per_take, vec![3, 2, 4]);
    }

    #[test]
    fn test_zero_hit_take_gives_silent_composite() {
        let takes = vec![
            take(&[0.4, 0.9], &[0.8, 0.6], 1.5),
            Waveform::silent(SAMPLE_RATE as usize, SAMPLE_RATE).unwrap(),
        ];

        let result = build_composite(&takes, &CompositeConfig::default()).unwrap();

        assert!(result.hits.is_empty());
        assert_eq!(result.waveform.len(), (0.5 * SAMPLE_RATE as f64) as usize);
        assert!(result.waveform.samples().iter().all(|&s| s == 0.0));
        assert!(result.flags.contains(&CompositeFlag::NoSharedHits));
    }

    #[test]
    fn test_segment_past_end_is_truncated() {
        let takes = vec![
            take(&[0.5, 1.0], &[0.8, 0.4], 1.6),
            take(&[0.52, 1.03], &[0.7, 0.5], 1.6),
        ];
        let config = CompositeConfig {
            trailing_pad: 0.05,
            ..CompositeConfig::default()
        };

        let result = build_composite(&takes, &config).unwrap();

        assert_eq!(
            result.waveform.len(),
            composite_len(&result.hits, config.trailing_pad, SAMPLE_RATE)
        );
        let last = result.selections.last().unwrap();
        assert!(last.written < segment_len(config.segment_duration, SAMPLE_RATE));
        assert_eq!(last.dest_sample + last.written, result.waveform.len());
    }

    #[test]
    fn test_volumes_are_finite() {
        let takes = vec![
            take(&[0.3, 0.8, 1.3], &[0.05, 1.0, 0.4], 1.8),
            take(&[0.31, 0.82, 1.33], &[0.1, 0.9, 0.3], 1.8),
        ];
        let config = CompositeConfig {
            parallel: false,
            ..CompositeConfig::default()
        };
        let result = build_composite(&takes, &config).unwrap();
        for hit in &result.hits {
            let v = hit.volume.unwrap();
            assert!(v.is_finite() && v >= -100.0);
        }
    }

    #[test]
    fn test_files_end_to_end() {
        let dir = scratch_dir("e2e");
        let times = [[0.4, 0.9, 1.4], [0.43, 0.95, 1.41], [0.38, 0.91, 1.45]];
        let amps = [[0.9, 0.4, 0.6], [0.8, 0.5, 0.7], [0.7, 0.45, 0.65]];

        let mut inputs = Vec::new();
        for (i, (t, a)) in times.iter().zip(&amps).enumerate() {
            let path = dir.join(format!("take{}.wav", i + 1));
            write_wav(&path, &synth_take(t, a, 2.0), SAMPLE_RATE);
            inputs.push(path);
        }
        inputs.push(dir.join("missing.wav"));

        let output = dir.join("composite.wav");
        let (result, failures) = composite_files(
            &inputs,
            &output,
            &CompositeConfig::default(),
            OutputFormat::Float32,
        )
        .expect("pipeline should succeed");

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, dir.join("missing.wav"));
        assert_eq!(result.metadata.take_count, 3);
        assert_eq!(result.hits.len(), 3);

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().sample_rate, SAMPLE_RATE);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len() as usize, result.waveform.len());

        let report = result.report();
        assert!(report.starts_with("Average Hit Times (seconds): [0.00, "));
        assert!(report.contains("Average Volumes for Each Hit Position: ["));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_pcm16_output_written() {
        let dir = scratch_dir("pcm16");
        let path = dir.join("take1.wav");
        write_wav(&path, &synth_take(&[0.3, 0.7], &[0.6, 0.9], 1.2), SAMPLE_RATE);

        let output = dir.join("composite.wav");
        let (result, failures) =
            composite_files(&[&path], &output, &CompositeConfig::default(), OutputFormat::Pcm16)
                .unwrap();

        assert!(failures.is_empty());
        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 16);
        assert_eq!(reader.len() as usize, result.waveform.len());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mismatch_names_input_after_failed_load() {
        let dir = scratch_dir("mismatch");
        let samples = synth_take(&[0.3, 0.7], &[0.6, 0.9], 1.2);
        let a44 = dir.join("a44.wav");
        let b48 = dir.join("b48.wav");
        write_wav(&a44, &samples, 44100);
        write_wav(&b48, &samples, 48000);
        let inputs = vec![dir.join("missing.wav"), a44, b48];

        let err = composite_files(
            &inputs,
            &dir.join("composite.wav"),
            &CompositeConfig::default(),
            OutputFormat::Pcm16,
        )
        .unwrap_err();
        assert_eq!(
            err,
            CompositeError::SampleRateMismatch {
                expected: 44100,
                found: 48000,
                take: 2
            }
        );

        // Loading separately keeps the failures even though the build fails
        let loaded = load_takes(&inputs, false);
        assert_eq!(loaded.failures.len(), 1);
        assert_eq!(loaded.failures[0].0, inputs[0]);
        assert_eq!(loaded.input_index(0), Some(1));
        assert!(build_composite_loaded(&loaded, &CompositeConfig::default()).is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_selections_name_input_after_failed_load() {
        let dir = scratch_dir("selections");
        let samples = synth_take(&[0.4, 0.9, 1.4], &[0.9, 0.4, 0.6], 2.0);
        let first = dir.join("first.wav");
        let second = dir.join("second.wav");
        write_wav(&first, &samples, SAMPLE_RATE);
        write_wav(&second, &samples, SAMPLE_RATE);
        let inputs = vec![dir.join("missing.wav"), first, second];

        let (result, failures) = composite_files(
            &inputs,
            &dir.join("composite.wav"),
            &CompositeConfig::default(),
            OutputFormat::Float32,
        )
        .unwrap();

        assert_eq!(failures.len(), 1);
        assert!(!result.selections.is_empty());
        // Identical takes tie; the first loaded take is input 1
        assert!(result.selections.iter().all(|s| s.take == 1));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_stereo_pcm16_loads_as_mono_average() {
        let dir = scratch_dir("stereo");
        let path = dir.join("stereo.wav");

        let mut frames: Vec<(i16, i16)> = (0..4410)
            .map(|i| {
                let left = ((i as f32 * 0.05).sin() * 20000.0) as i16;
                let right = ((i as f32 * 0.013).cos() * 12000.0) as i16;
                (left, right)
            })
            .collect();
        frames.push((i16::MAX, i16::MAX));
        frames.push((i16::MIN, i16::MIN));
        frames.push((i16::MAX, i16::MIN));
        write_stereo_pcm16(&path, &frames);

        let take = load_take(&path).expect("stereo PCM should decode");

        assert_eq!(take.sample_rate(), SAMPLE_RATE);
        assert_eq!(take.len(), frames.len());
        for (i, (&s, &(left, right))) in take.samples().iter().zip(&frames).enumerate() {
            let expected = (left as f32 / 32768.0 + right as f32 / 32768.0) / 2.0;
            assert!(
                (s - expected).abs() < 1e-4,
                "frame {}: got {}, expected {}",
                i,
                s,
                expected
            );
        }
        assert!(take.samples().iter().all(|s| s.abs() <= 1.0));

        fs::remove_dir_all(&dir).ok();
    }
}
