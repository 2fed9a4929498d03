use crate::{
    broadcast_values, DType, ElementType, Enforcer, Expression, Layout, Order,
    Selector, Shape, Strided, StridedMut, Strides, View, ViewError, ViewMut,
};

/// A minimal owning n-dimensional array, stored contiguously in row-major or column-major
/// order. Views borrow its buffer.
#[derive(Clone)]
pub struct DenseArray<T> {
    data: Vec<T>,
    shape: Shape,
    strides: Strides,
    layout: Layout,
}

impl<T: ElementType> DenseArray<T> {
    /// Creates a row-major array from a chunk of data.
    ///
    /// # Panics
    /// If the data length differs from the number of elements of `shape`.
    pub fn from_data<U: AsRef<[T]>>(data: U, shape: Shape) -> Self {
        Self::from_data_with_layout(data, shape, Layout::RowMajor)
    }

    /// Creates an array whose data is stored in `layout` order.
    /// `Layout::Dynamic` is not a storage order and is treated as row-major.
    ///
    /// # Panics
    /// If the data length differs from the number of elements of `shape`.
    pub fn from_data_with_layout<U: AsRef<[T]>>(data: U, shape: Shape, layout: Layout) -> Self {
        let data = data.as_ref().to_vec();
        assert_eq!(
            data.len(),
            shape.numel(),
            "Data length {} does not match shape {:?}",
            data.len(),
            shape
        );
        let layout = match layout {
            Layout::Dynamic => Layout::RowMajor,
            l => l,
        };
        let strides = Strides::contiguous(&shape, layout);
        Self {
            data,
            shape,
            strides,
            layout,
        }
    }

    pub fn full(shape: Shape, value: T) -> Self {
        Self::from_data(vec![value; shape.numel()], shape)
    }

    pub fn zeros(shape: Shape) -> Self {
        Self::full(shape, T::zero())
    }

    pub fn ones(shape: Shape) -> Self {
        Self::full(shape, T::one())
    }

    /// `0, 1, 2, ...` laid out in row-major order over `shape`.
    pub fn arange(shape: Shape) -> Self {
        let numel = shape.numel();
        let mut data = Vec::with_capacity(numel);
        let mut value = T::zero();
        for k in 0..numel {
            if k > 0 {
                value = value + T::one();
            }
            data.push(value);
        }
        Self::from_data(data, shape)
    }

    #[cfg(feature = "rand")]
    pub fn randn(shape: Shape) -> Self
    where
        T: num_traits::Float,
    {
        use rand_distr::{Distribution, StandardNormal};
        let mut rng = rand::thread_rng();
        let data = (0..shape.numel())
            .map(|_| {
                let sample: f32 = StandardNormal.sample(&mut rng);
                T::from(sample).unwrap_or_else(T::nan)
            })
            .collect::<Vec<_>>();
        Self::from_data(data, shape)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &Strides {
        &self.strides
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn numel(&self) -> usize {
        self.shape.numel()
    }

    pub fn dt(&self) -> DType {
        T::dt()
    }

    /// The storage buffer, in storage order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn view(&self, selectors: &[Selector]) -> Result<View<'_, T>, ViewError> {
        View::new(self, selectors)
    }

    pub fn view_mut(&mut self, selectors: &[Selector]) -> Result<ViewMut<'_, T>, ViewError> {
        ViewMut::new(self, selectors)
    }

    fn offset_of(&self, index: &[usize]) -> usize {
        self.strides
            .iter()
            .zip(index)
            .map(|(&s, &i)| s * i as isize)
            .sum::<isize>() as usize
    }

    /// Checked access; omitted trailing indices are 0.
    pub fn at(&self, index: &[usize]) -> Result<&T, ViewError> {
        Enforcer::check_index(index, &self.shape)?;
        Ok(&self.data[self.offset_of(index)])
    }

    pub fn at_mut(&mut self, index: &[usize]) -> Result<&mut T, ViewError> {
        Enforcer::check_index(index, &self.shape)?;
        let offset = self.offset_of(index);
        Ok(&mut self.data[offset])
    }

    /// Elements in the logical `order`, independent of the storage order.
    pub fn to_vec(&self, order: Order) -> Vec<T> {
        if self.layout.order() == Some(order) {
            return self.data.clone();
        }
        View::from_geometry(&self.data, Strided::geometry(self)).to_vec(order)
    }

    /// Assigns the `src` view of this array to its `dst` view.
    ///
    /// Source values are read in full before the first write, so overlapping selections
    /// behave as if the source had been copied first.
    pub fn assign_within(&mut self, dst: &[Selector], src: &[Selector]) -> Result<(), ViewError> {
        self.assign_within_map(dst, src, |_, s| s)
    }

    /// Like [DenseArray::assign_within], writing `f(dst, src)` for every element pair.
    pub fn assign_within_map<F>(
        &mut self,
        dst: &[Selector],
        src: &[Selector],
        mut f: F,
    ) -> Result<(), ViewError>
    where
        F: FnMut(T, T) -> T,
    {
        let (target, _) = Strided::geometry(&*self).compose(dst)?;
        let source = self.view(src)?;
        Enforcer::check_broadcast(source.shape(), target.shape())?;
        let values = broadcast_values(&source, target.shape());
        let current = View::from_geometry(&self.data, target).to_vec(Order::RowMajor);
        log::debug!(
            "Assigning {:?} within array of shape {:?} through a temporary",
            source.shape(),
            self.shape
        );
        let combined = current
            .into_iter()
            .zip(values)
            .map(|(d, s)| f(d, s))
            .collect::<Vec<_>>();
        self.view_mut(dst)?.write_row_major(combined);
        Ok(())
    }
}

impl<T: ElementType + num_traits::Float> DenseArray<T> {
    /// Elementwise closeness check, failing with the worst mismatch.
    pub fn all_close(&self, other: &Self, atol: f32, rtol: f32) -> anyhow::Result<()> {
        if self.shape != other.shape {
            anyhow::bail!("Shape mismatch {:?} != {:?}", self.shape, other.shape)
        }
        let mut stats = CloseStats::new(atol, rtol);
        let lhs = self.to_vec(Order::RowMajor);
        let rhs = other.to_vec(Order::RowMajor);
        for (position, (a, b)) in lhs.iter().zip(rhs.iter()).enumerate() {
            let a = a.to_f32().unwrap_or(f32::NAN);
            let b = b.to_f32().unwrap_or(f32::NAN);
            stats.update(a, b, position);
        }

        if stats.fail_count > 0 {
            anyhow::bail!(
                "{} samples not close - AVGE={} MAE={} at flat position {:?}",
                stats.fail_count,
                stats.avg_error(),
                stats.max_abs_error,
                stats.max_abs_error_position,
            );
        }
        log::debug!(
            "All close - AVGE={} MAE={} at flat position {:?}",
            stats.avg_error(),
            stats.max_abs_error,
            stats.max_abs_error_position
        );
        Ok(())
    }
}

struct CloseStats {
    total_error: f32,
    max_abs_error: f32,
    max_abs_error_position: Option<usize>,
    element_count: usize,
    fail_count: usize,
    atol: f32,
    rtol: f32,
}

impl CloseStats {
    fn new(atol: f32, rtol: f32) -> Self {
        Self {
            total_error: 0.0,
            max_abs_error: 0.0,
            max_abs_error_position: None,
            element_count: 0,
            fail_count: 0,
            atol,
            rtol,
        }
    }

    fn update(&mut self, a: f32, b: f32, position: usize) {
        let abs_diff = (a - b).abs();
        self.total_error += abs_diff;
        self.element_count += 1;

        if abs_diff > self.max_abs_error {
            self.max_abs_error = abs_diff;
            self.max_abs_error_position = Some(position);
        }

        if !self.is_close(a, b, abs_diff) {
            self.fail_count += 1;
        }
    }

    fn avg_error(&self) -> f32 {
        self.total_error / self.element_count.max(1) as f32
    }

    fn is_close(&self, a: f32, b: f32, abs_diff: f32) -> bool {
        (a.is_nan() && b.is_nan())
            || (a.is_infinite() && b.is_infinite() && a.signum() == b.signum())
            || abs_diff <= self.atol + self.rtol * b.abs()
    }
}

impl<T: ElementType> Expression<T> for DenseArray<T> {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn element(&self, index: &[usize]) -> T {
        self.data[self.offset_of(index)]
    }
}

impl<T: ElementType> Strided<T> for DenseArray<T> {
    fn strides(&self) -> Strides {
        self.strides.clone()
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T: ElementType> StridedMut<T> for DenseArray<T> {
    fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Logical equality: same shape and same elements at every index, whatever the storage order.
impl<T: ElementType> PartialEq for DenseArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.to_vec(Order::RowMajor) == other.to_vec(Order::RowMajor)
    }
}

impl<T: ElementType> std::fmt::Debug for DenseArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseArray")
            .field("dt", &T::dt())
            .field("shape", &self.shape)
            .field("layout", &self.layout)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: ElementType> From<&View<'_, T>> for DenseArray<T> {
    fn from(view: &View<'_, T>) -> Self {
        view.to_array()
    }
}
