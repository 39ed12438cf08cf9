/*!

This is the long-form manual for `ballot_aggregates` and `ballotviz`.

## Views

Every call to `compute` produces the data of three views over the same rows:

* a histogram of the keywords that appear more than 3 times, most frequent first
* the subjects ranked by total number of votes (yes and no), with their outcome and
  their top keyword. Without a selection, only the 25 largest subjects are kept. With a
  selection, all the subjects that carry the selected keyword are kept.
* the stream series: for each of the 30 most frequent keywords, the number of times it
  appears each year. All the series share the same years. The selected keyword always has
  a series: if it is not among the 30 most frequent keywords, it takes the place of the 30th.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, with a header row
* `xlsx` Excel spreadsheets

Both formats expect the columns of the historical ballot measures dataset:

| Subject | Yes Votes | No Votes | Pass or Fail | Year | Keyword1 | ... | Keyword5 |
|---------|-----------|----------|--------------|------|----------|-----|----------|
| Parks   | 1200      | 800      | Pass         | 1990 | Parks    |     |          |

The names of the columns can be changed in the configuration. The keyword columns are
optional. Rows with a missing subject, or with vote counts or a year that are not
numbers, are skipped and reported.

## Configuration

`ballotviz` accepts a JSON configuration file with the `--config` flag:

```json
{
  "outputSettings": { "datasetName": "Bay Area ballot measures" },
  "dataSources": [
    { "provider": "csv", "filePath": "List_of_Historical_Ballot_Measures.csv" }
  ],
  "rules": { "histogramMinCount": 3, "streamTopKeywords": 30, "subjectTopCount": 25 },
  "selectedKeyword": "Housing"
}
```

The paths of the data sources are relative to the configuration file. For `xlsx` sources,
`excelWorksheetName` selects the worksheet. The columns are set with `subjectColumn`,
`yesVotesColumn`, `noVotesColumn`, `passFailColumn`, `yearColumn` and `keywordColumns`.

## Command line

```bash
ballotviz -i List_of_Historical_Ballot_Measures.csv --keyword Housing --out summary.json
```

With `--interactive`, `ballotviz` reads one keyword per line from the standard input and
recomputes all the views after every line. Entering the selected keyword again, an empty
line or `:reset` clears the selection. `:quit` stops.

With `--reference`, the summary is compared with a previous summary and the differences
are printed.

*/
