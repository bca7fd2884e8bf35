use serde::Serialize;

/// Splits an ordered collection into fixed-size pages.
///
/// Bad page input never fails: anything that is not an integer, or is
/// below 1, resolves to the first page, and anything past the end resolves
/// to the last page. An empty collection has a single empty page.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	per_page: i64,
}

impl Paginator {
	pub const fn new(per_page: i64) -> Self {
		Self { per_page }
	}

	pub fn num_pages(&self, count: i64) -> i64 {
		if count <= 0 {
			1
		} else {
			(count + self.per_page - 1) / self.per_page
		}
	}

	/// Resolves the raw `page` parameter against a collection of `count` items.
	pub fn resolve(&self, count: i64, page: Option<&str>) -> PageRequest {
		let num_pages = self.num_pages(count);
		let page = page.map(str::trim);
		let number = match page.map(str::parse::<i64>) {
			Some(Ok(number)) if number > num_pages => num_pages,
			Some(Ok(number)) if number >= 1 => number,
			// Too many digits for an `i64`, so it is past the end
			Some(Err(..)) if page.is_some_and(is_digits) => num_pages,
			_ => 1,
		};

		PageRequest {
			number,
			num_pages,
			count,
			per_page: self.per_page,
		}
	}
}

fn is_digits(page: &str) -> bool {
	!page.is_empty() && page.bytes().all(|b| b.is_ascii_digit())
}

/// A resolved, always valid, page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
	pub per_page: i64,
}

impl PageRequest {
	pub fn offset(&self) -> i64 {
		(self.number - 1) * self.per_page
	}

	pub fn limit(&self) -> i64 {
		self.per_page
	}

	/// Wraps the items fetched with [`Self::offset`] and [`Self::limit`].
	pub fn page<T>(self, items: Vec<T>) -> Page<T> {
		Page {
			items,
			number: self.number,
			num_pages: self.num_pages,
			count: self.count,
			previous_page_number: (self.number > 1).then(|| self.number - 1),
			next_page_number: (self.number < self.num_pages).then(|| self.number + 1),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub number: i64,
	pub num_pages: i64,
	pub count: i64,
	pub previous_page_number: Option<i64>,
	pub next_page_number: Option<i64>,
}
