use anyhow::Result;
use candle_core::Device;
use nnue_feed::{decode, FeatureBatchEncoder, FeatureSet, PositionGroup, PositionRecord, SENTINEL};
use rand::{rngs::StdRng, Rng, SeedableRng};

const MAX: usize = 32;

fn random_records(rng: &mut StdRng, n: usize) -> Vec<PositionRecord> {
    let n_features = FeatureSet::HalfKp.input_features() as i32;
    (0..n)
        .map(|_| {
            let k = rng.gen_range(0..=MAX);
            PositionRecord {
                white_to_move: rng.gen::<bool>(),
                white_features: (0..k).map(|_| rng.gen_range(0..n_features)).collect(),
                black_features: (0..k).map(|_| rng.gen_range(0..n_features)).collect(),
                outcome: rng.gen_range(0.0..=1.0),
                score: rng.gen_range(-1000.0..1000.0),
            }
        })
        .collect()
}

fn active(slots: &[i32]) -> Vec<i64> {
    slots
        .iter()
        .filter(|&&f| f != SENTINEL)
        .map(|&f| f as i64)
        .collect()
}

#[test]
fn test_decode_recovers_perspectives() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(7);
    let encoder = FeatureBatchEncoder::new(FeatureSet::HalfKp)?;

    for _ in 0..10 {
        let records = random_records(&mut rng, 64);
        let group = PositionGroup::from_records(&records, MAX)?;
        let batch = encoder.encode(&group, &Device::Cpu)?;

        let n_active: usize = (0..group.len())
            .map(|i| active(group.white_slots(i)).len())
            .sum();
        assert_eq!(batch.len(), 64);
        assert_eq!(batch.nnz(), n_active);
        assert_eq!(batch.stm_indices().dims(), &[n_active, 2]);
        assert_eq!(batch.values().to_vec1::<f32>()?, vec![1.0; n_active]);

        for (i, (stm, nstm)) in decode(&batch)?.into_iter().enumerate() {
            let white = active(group.white_slots(i));
            let black = active(group.black_slots(i));
            if records[i].white_to_move {
                assert_eq!((stm, nstm), (white, black));
            } else {
                assert_eq!((stm, nstm), (black, white));
            }
        }
    }
    Ok(())
}

#[test]
fn test_swapping_sides_gives_same_batch() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    let encoder = FeatureBatchEncoder::new(FeatureSet::HalfKp)?;
    let records = random_records(&mut rng, 32);
    let swapped = records
        .iter()
        .map(|r| PositionRecord {
            white_to_move: !r.white_to_move,
            white_features: r.black_features.clone(),
            black_features: r.white_features.clone(),
            ..r.clone()
        })
        .collect::<Vec<_>>();

    let a = encoder.encode(&PositionGroup::from_records(&records, MAX)?, &Device::Cpu)?;
    let b = encoder.encode(&PositionGroup::from_records(&swapped, MAX)?, &Device::Cpu)?;

    assert_eq!(a.stm_indices().to_vec2::<i64>()?, b.stm_indices().to_vec2::<i64>()?);
    assert_eq!(a.nstm_indices().to_vec2::<i64>()?, b.nstm_indices().to_vec2::<i64>()?);
    assert_eq!(a.cp_values()?, b.cp_values()?);
    Ok(())
}

#[test]
fn test_rows_are_in_range_and_ordered() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let encoder = FeatureBatchEncoder::new(FeatureSet::HalfKp)?;
    let group = PositionGroup::from_records(&random_records(&mut rng, 16), MAX)?;
    let batch = encoder.encode(&group, &Device::Cpu)?;

    let rows = batch
        .stm_indices()
        .to_vec2::<i64>()?
        .into_iter()
        .map(|pair| pair[0])
        .collect::<Vec<_>>();
    assert!(rows.iter().all(|&r| r >= 0 && (r as usize) < batch.len()));
    assert!(rows.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}
