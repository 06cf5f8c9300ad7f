// Path and File Name : /home/decepticloud/core/trainer/src/tests/metrics_tests.rs
// Author: nXxBku0CKFAJCBN3X1g3bQk7OxYQylg8CMw1iGsq7gU
// Details of functionality of this file: Tests for metrics sinks - CSV result files (headers once, append across runs), fan-out

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::metrics::{
        CsvMetricsSink, EpisodeRecord, MemoryMetricsSink, MetricsSink, MultiSink, TimestepRecord, TracingMetricsSink,
        SUMMARY_FILE, TIMESTEP_FILE,
    };

    fn timestep(episode: usize, timestep: usize, loss: Option<f64>) -> TimestepRecord {
        TimestepRecord {
            run_id: "run-1".to_string(),
            episode,
            timestep,
            action: 1,
            reward: -1.0,
            cumulative_reward: -(timestep as f64),
            epsilon: 1.0,
            ssh_attack: 0,
            web_attack: 0,
            active_asset: 1,
            loss,
            timestamp: Utc::now(),
        }
    }

    fn episode(episode: usize) -> EpisodeRecord {
        EpisodeRecord {
            run_id: "run-1".to_string(),
            episode,
            total_reward: 6.0,
            epsilon: 0.995,
            timesteps: 5,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_csv_headers_written_once() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut sink = CsvMetricsSink::create(dir.path()).unwrap();
            sink.record_timestep(&timestep(1, 1, None)).unwrap();
            sink.record_timestep(&timestep(1, 2, Some(0.25))).unwrap();
            sink.record_episode(&episode(1)).unwrap();
            sink.flush().unwrap();
        }
        {
            let mut sink = CsvMetricsSink::create(dir.path()).unwrap();
            sink.record_timestep(&timestep(1, 1, None)).unwrap();
            sink.record_episode(&episode(1)).unwrap();
        }

        let timesteps = std::fs::read_to_string(dir.path().join(TIMESTEP_FILE)).unwrap();
        let lines: Vec<&str> = timesteps.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("run_id,episode,timestep,action,reward,cumulative_reward,epsilon"));
        assert_eq!(timesteps.matches("run_id").count(), 1);

        let summary = std::fs::read_to_string(dir.path().join(SUMMARY_FILE)).unwrap();
        assert_eq!(summary.lines().count(), 3);
        assert!(summary.starts_with("run_id,episode,total_reward,epsilon,timesteps,timestamp"));
    }

    #[test]
    fn test_csv_rows_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvMetricsSink::create(dir.path()).unwrap();
        sink.record_timestep(&timestep(2, 3, Some(0.5))).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join(TIMESTEP_FILE)).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(&row[1], "2");
        assert_eq!(&row[2], "3");
        assert_eq!(&row[10], "0.5");
    }

    #[test]
    fn test_multi_sink_fans_out() {
        let mut sink = MultiSink::new(vec![Box::new(TracingMetricsSink), Box::new(MemoryMetricsSink::default())]);
        sink.record_timestep(&timestep(1, 1, None)).unwrap();
        sink.record_episode(&episode(1)).unwrap();
        sink.flush().unwrap();

        let mut memory = MemoryMetricsSink::default();
        memory.record_timestep(&timestep(1, 1, None)).unwrap();
        assert_eq!(memory.timesteps.len(), 1);
        assert!(memory.episodes.is_empty());
    }
}
