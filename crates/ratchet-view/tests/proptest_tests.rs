#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use std::collections::HashMap;
    use ratchet_view::{
        to_slice_info, DenseArray, Indices, Order, Selector, Selectors, Shape, ToNdArray,
    };
    use test_strategy::proptest;

    fn axis_selector(len: usize) -> BoxedStrategy<Selector> {
        let n = len as isize;
        prop_oneof![
            (-n..n).prop_map(Selector::Index),
            Just(Selector::All),
            (0..=n, 0..=n, 1isize..=3)
                .prop_map(|(a, b, step)| Selector::stepped(Some(a.min(b)), Some(a.max(b)), step)),
            (-n..n, 1isize..=2).prop_map(|(a, step)| Selector::stepped(Some(a), None, step)),
        ]
        .boxed()
    }

    fn listed_selector(len: usize) -> BoxedStrategy<Selector> {
        let n = len as isize;
        prop_oneof![
            prop::collection::vec(-n..n, 1..=4).prop_map(Selector::Keep),
            prop::collection::vec(0..n, 0..len).prop_map(Selector::Drop),
            (-n..n, -2isize..=-1).prop_map(|(a, step)| Selector::stepped(Some(a), None, step)),
        ]
        .boxed()
    }

    /// A base shape and one selector per axis, new axes interleaved.
    #[derive(Debug, Clone)]
    struct SliceProblem {
        shape: Shape,
        selectors: Vec<Selector>,
    }

    impl SliceProblem {
        fn strategy(listed: bool) -> BoxedStrategy<Self> {
            prop::collection::vec(1usize..=5, 1..=4)
                .prop_flat_map(move |dims| {
                    let per_axis = dims
                        .iter()
                        .map(|&len| {
                            let selector = if listed {
                                prop_oneof![axis_selector(len), listed_selector(len)].boxed()
                            } else {
                                axis_selector(len)
                            };
                            (selector, any::<bool>())
                        })
                        .collect::<Vec<_>>();
                    (Just(Shape::from(dims)), per_axis, any::<bool>())
                })
                .prop_map(|(shape, per_axis, implicit_last)| {
                    let mut selectors = vec![];
                    for (selector, new_axis) in per_axis {
                        if new_axis {
                            selectors.push(Selector::NewAxis);
                        }
                        selectors.push(selector);
                    }
                    // Leave the last axis to the implicit `All`.
                    if implicit_last && selectors.len() > 1 {
                        selectors.pop();
                    }
                    SliceProblem { shape, selectors }
                })
                .boxed()
        }
    }

    impl Arbitrary for SliceProblem {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            Self::strategy(false)
        }
    }

    /// Like [SliceProblem], with keep/drop selectors and negative steps allowed.
    #[derive(Debug, Clone)]
    struct ListedProblem(SliceProblem);

    impl Arbitrary for ListedProblem {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            SliceProblem::strategy(true).prop_map(ListedProblem).boxed()
        }
    }

    fn run_ndarray_trial(prob: SliceProblem) -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();
        let SliceProblem { shape, selectors } = prob;
        let a = DenseArray::<f32>::randn(shape);
        let view = a.view(&selectors)?;

        let info = to_slice_info(&selectors, a.rank())
            .ok_or_else(|| anyhow::anyhow!("No ndarray equivalent for {:?}", selectors))?;
        let nd = a.to_ndarray();
        let ground = nd.slice(info.as_slice());

        assert_eq!(view.shape().to_vec(), ground.shape().to_vec());
        let ours = DenseArray::from(view.to_ndarray());
        let theirs = DenseArray::from(ground.to_owned());
        ours.all_close(&theirs, 0.0, 0.0)?;

        let column_major = view.to_vec(Order::ColumnMajor);
        let reference = ground.t().iter().copied().collect::<Vec<_>>();
        assert_eq!(column_major, reference);
        Ok(())
    }

    #[proptest(cases = 64)]
    fn test_slices_match_ndarray(prob: SliceProblem) {
        run_ndarray_trial(prob).unwrap();
    }

    #[proptest(cases = 64)]
    fn test_selector_queries_match_shape(prob: SliceProblem) {
        let a = DenseArray::<i32>::zeros(prob.shape.clone());
        let view = a.view(&prob.selectors).unwrap();
        let queries = Selectors::new(&prob.selectors);
        prop_assert_eq!(queries.result_rank(a.rank()), view.rank());
        for axis in 0..view.rank() {
            match queries.parent_axis(axis) {
                None => {
                    prop_assert_eq!(view.shape()[axis], 1);
                }
                Some(parent) => {
                    prop_assert!(parent < a.rank());
                }
            }
        }
    }

    fn run_translation_trial(prob: ListedProblem) -> anyhow::Result<()> {
        let SliceProblem { shape, selectors } = prob.0;
        let a = DenseArray::<i32>::arange(shape);
        let outer = a.view(&selectors)?;

        // Reverse every remaining axis, then collapse the first one if there is one.
        let reversed = vec![Selector::stepped(None, None, -1); outer.rank()];
        let mut nested = outer.view(&reversed)?;
        if nested.rank() > 0 && nested.shape()[0] > 0 {
            nested = nested.view(&[Selector::index(-1), Selector::NewAxis])?;
        }

        for view in [&outer, &nested] {
            for index in Indices::new(view.shape(), Order::RowMajor) {
                let base = view.base_index(&index)?;
                assert_eq!(a.at(&base)?, view.at(&index)?, "{:?} -> {:?}", index, base);
            }
        }
        Ok(())
    }

    #[proptest(cases = 64)]
    fn test_translation_matches_geometry(prob: ListedProblem) {
        run_translation_trial(prob).unwrap();
    }

    #[proptest(cases = 64)]
    fn test_traversal_is_consistent(prob: ListedProblem) {
        let a = DenseArray::<i32>::arange(prob.0.shape.clone());
        let view = a.view(&prob.0.selectors).unwrap();

        let forward = view.iter(Order::RowMajor).copied().collect::<Vec<_>>();
        prop_assert_eq!(forward.len(), view.numel());

        let mut backward = view.iter(Order::RowMajor).rev().copied().collect::<Vec<_>>();
        backward.reverse();
        prop_assert_eq!(&backward, &forward);

        for (k, expected) in forward.iter().enumerate() {
            prop_assert_eq!(view.iter(Order::RowMajor).nth(k), Some(expected));
        }

        let by_index = Indices::new(view.shape(), Order::RowMajor)
            .map(|index| view[&index[..]])
            .collect::<Vec<_>>();
        prop_assert_eq!(by_index, forward);
    }

    #[proptest(cases = 32)]
    fn test_assignment_last_write_wins(prob: ListedProblem) {
        let selectors = prob.0.selectors;
        let mut a = DenseArray::<i32>::zeros(prob.0.shape.clone());
        let src_shape = a.view(&selectors).unwrap().shape().clone();
        let src = DenseArray::<i32>::arange(src_shape.clone()).to_vec(Order::RowMajor);
        let expected = {
            let view = a.view(&selectors).unwrap();
            let mut expected = HashMap::new();
            for (index, &value) in Indices::new(&src_shape, Order::RowMajor).zip(src.iter()) {
                expected.insert(view.base_index(&index).unwrap(), value);
            }
            expected
        };

        let src = DenseArray::from_data(src, src_shape);
        a.view_mut(&selectors).unwrap().assign(&src).unwrap();
        for (base, value) in expected {
            prop_assert_eq!(a.at(&base).unwrap(), &value);
        }
    }
}
